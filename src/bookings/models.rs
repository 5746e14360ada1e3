use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;

use crate::auth::{Claims, Role};
use crate::db;
use crate::errors::ServiceError;
use crate::payments::Payment;
use crate::schema::{bookings, timeslots, users, venues};
use crate::venues::Venue;

/// fallback hourly rate in rupees for venues without a configured price
pub const DEFAULT_HOURLY_RATE: i64 = 110;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl Status {
    pub fn parse(status: &str) -> Option<Status> {
        match status {
            "Pending" => Some(Status::Pending),
            "Confirmed" => Some(Status::Confirmed),
            "Cancelled" => Some(Status::Cancelled),
            "Completed" => Some(Status::Completed),
            _ => None,
        }
    }

    /// Pending -> Confirmed -> Completed, with Cancelled reachable
    /// from every non-terminal state
    pub fn can_transition(self, to: Status) -> bool {
        match (self, to) {
            (Status::Pending, Status::Confirmed) => true,
            (Status::Confirmed, Status::Completed) => true,
            (Status::Pending, Status::Cancelled) => true,
            (Status::Confirmed, Status::Cancelled) => true,
            _ => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Completed | Status::Cancelled)
    }

    /// Ok(true) when a cancel has work to do, Ok(false) for the
    /// idempotent second cancel, a conflict once completed.
    pub fn cancellable(self) -> Result<bool, ServiceError> {
        match self {
            Status::Completed => Err(ServiceError::Conflict(
                "a completed booking cannot be cancelled".to_string(),
            )),
            Status::Cancelled => Ok(false),
            _ => Ok(true),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Status::Pending => write!(f, "Pending"),
            Status::Confirmed => write!(f, "Confirmed"),
            Status::Cancelled => write!(f, "Cancelled"),
            Status::Completed => write!(f, "Completed"),
        }
    }
}

#[derive(Debug, Serialize, Queryable, Identifiable)]
pub struct Timeslot {
    pub id: i64,
    pub venue_id: i64,
    pub slot_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub price: i64,
    pub is_available: bool,
}

impl Timeslot {
    pub fn find(id: i64, conn: &db::Conn) -> Result<Timeslot, ServiceError> {
        let slot = timeslots::table.filter(timeslots::id.eq(id)).first(conn)?;

        Ok(slot)
    }

    fn find_window(
        venue_id: i64,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        conn: &db::Conn,
    ) -> Result<Option<Timeslot>, ServiceError> {
        let slot = timeslots::table
            .filter(timeslots::venue_id.eq(venue_id))
            .filter(timeslots::slot_date.eq(date))
            .filter(timeslots::start_time.eq(start))
            .filter(timeslots::end_time.eq(end))
            .first(conn)
            .optional()?;

        Ok(slot)
    }

    fn create(
        venue_id: i64,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        price: i64,
        conn: &db::Conn,
    ) -> Result<Timeslot, ServiceError> {
        let slot = diesel::insert_into(timeslots::table)
            .values((
                timeslots::venue_id.eq(venue_id),
                timeslots::slot_date.eq(date),
                timeslots::start_time.eq(start),
                timeslots::end_time.eq(end),
                timeslots::price.eq(price),
                timeslots::is_available.eq(true),
            ))
            .get_result(conn)?;

        Ok(slot)
    }

    /// availability calendar for a venue, optionally narrowed to one day
    pub fn find_for_venue(
        venue_id: i64,
        date: Option<NaiveDate>,
        conn: &db::Conn,
    ) -> Result<Vec<Timeslot>, ServiceError> {
        let mut query = timeslots::table
            .filter(timeslots::venue_id.eq(venue_id))
            .order((timeslots::slot_date, timeslots::start_time))
            .into_boxed();

        if let Some(date) = date {
            query = query.filter(timeslots::slot_date.eq(date));
        }

        let slots = query.load(conn)?;

        Ok(slots)
    }

    pub fn set_available(id: i64, available: bool, conn: &db::Conn) -> Result<(), ServiceError> {
        diesel::update(timeslots::table.filter(timeslots::id.eq(id)))
            .set(timeslots::is_available.eq(available))
            .execute(conn)?;

        Ok(())
    }
}

/// price for a window at an hourly rate, pro-rated to the minute
pub fn slot_price(hourly_rate: i64, start: NaiveTime, end: NaiveTime) -> i64 {
    let rate = if hourly_rate > 0 {
        hourly_rate
    } else {
        DEFAULT_HOURLY_RATE
    };

    let minutes = (end - start).num_minutes();

    rate * minutes / 60
}

#[derive(Debug, Serialize, Queryable, Identifiable)]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub venue_id: i64,
    pub timeslot_id: i64,
    pub team_id: Option<i64>,
    pub booking_date: NaiveDate,
    pub total_amount: i64,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBooking {
    pub venue_id: i64,
    pub booking_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub team_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBooking {
    pub status: Option<String>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub team_id: Option<i64>,
}

#[derive(Serialize, Queryable, Debug)]
pub struct BookingVenue {
    pub id: i64,
    pub venue_name: String,
}

#[derive(Serialize, Queryable, Debug)]
pub struct BookingPlayer {
    pub id: i64,
    pub name: String,
}

#[derive(Serialize, Queryable, Debug)]
pub struct BookingResponse {
    pub id: i64,
    pub booking_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: String,
    pub total_amount: i64,
    pub venue: BookingVenue,
    pub player: BookingPlayer,
}

type BookingColumns = (
    bookings::columns::id,
    bookings::columns::booking_date,
    timeslots::columns::start_time,
    timeslots::columns::end_time,
    bookings::columns::status,
    bookings::columns::total_amount,
    (venues::columns::id, venues::columns::venue_name),
    (users::columns::id, users::columns::name),
);

const BOOKING_COLUMNS: BookingColumns = (
    bookings::id,
    bookings::booking_date,
    timeslots::start_time,
    timeslots::end_time,
    bookings::status,
    bookings::total_amount,
    (venues::id, venues::venue_name),
    (users::id, users::name),
);

impl NewBooking {
    /// Book a venue for a time window.
    ///
    /// Finds or creates the timeslot, refuses taken slots, then inserts
    /// the booking with a pending payment and marks the slot unavailable.
    /// Runs as one transaction, the partial unique index on active
    /// bookings backstops concurrent attempts for the same slot.
    pub fn create(self, user_id: i64, conn: &db::Conn) -> Result<Booking, ServiceError> {
        conn.transaction::<Booking, ServiceError, _>(|| {
            let venue = Venue::find(self.venue_id, conn)?;

            let slot = match Timeslot::find_window(
                venue.id,
                self.booking_date,
                self.start_time,
                self.end_time,
                conn,
            )? {
                Some(slot) => {
                    if !slot.is_available {
                        conflict!("this time slot is no longer available");
                    }
                    slot
                }
                None => Timeslot::create(
                    venue.id,
                    self.booking_date,
                    self.start_time,
                    self.end_time,
                    slot_price(venue.price_per_hour, self.start_time, self.end_time),
                    conn,
                )?,
            };

            let taken = bookings::table
                .filter(bookings::timeslot_id.eq(slot.id))
                .filter(bookings::status.ne(Status::Cancelled.to_string()))
                .select(bookings::id)
                .first::<i64>(conn)
                .optional()?;

            if taken.is_some() {
                conflict!("this time slot is no longer available");
            }

            let booking: Booking = diesel::insert_into(bookings::table)
                .values((
                    bookings::user_id.eq(user_id),
                    bookings::venue_id.eq(venue.id),
                    bookings::timeslot_id.eq(slot.id),
                    bookings::team_id.eq(self.team_id),
                    bookings::booking_date.eq(self.booking_date),
                    bookings::total_amount.eq(slot.price),
                    bookings::status.eq(Status::Pending.to_string()),
                ))
                .get_result(conn)
                .map_err(|error| match ServiceError::from(error) {
                    ServiceError::Conflict(_) => {
                        ServiceError::Conflict("this time slot is no longer available".to_string())
                    }
                    error => error,
                })?;

            Payment::create_pending(booking.id, booking.total_amount, conn)?;

            Timeslot::set_available(slot.id, false, conn)?;

            Ok(booking)
        })
    }
}

impl Booking {
    pub fn find(id: i64, conn: &db::Conn) -> Result<Booking, ServiceError> {
        let booking = bookings::table.filter(bookings::id.eq(id)).first(conn)?;

        Ok(booking)
    }

    pub fn parsed_status(&self) -> Result<Status, ServiceError> {
        Status::parse(&self.status).ok_or_else(|| {
            error!("booking {} carries unknown status {}", self.id, self.status);
            ServiceError::InternalServerError
        })
    }

    /// the caller's bookings for players, bookings at the caller's
    /// venues for owners and everything for admins
    pub fn find_all(claims: &Claims, conn: &db::Conn) -> Result<Vec<BookingResponse>, ServiceError> {
        let mut query = bookings::table
            .inner_join(timeslots::table)
            .inner_join(venues::table)
            .inner_join(users::table)
            .select(BOOKING_COLUMNS)
            .order((bookings::booking_date.desc(), timeslots::start_time.desc()))
            .into_boxed();

        match claims.role()? {
            Role::Player => query = query.filter(bookings::user_id.eq(claims.user_id())),
            Role::VenueOwner => query = query.filter(venues::owner_id.eq(claims.user_id())),
            Role::Admin => (),
        }

        let bookings = query.load::<BookingResponse>(conn)?;

        Ok(bookings)
    }

    pub fn find_for_venue(
        venue_id: i64,
        conn: &db::Conn,
    ) -> Result<Vec<BookingResponse>, ServiceError> {
        let bookings = bookings::table
            .inner_join(timeslots::table)
            .inner_join(venues::table)
            .inner_join(users::table)
            .select(BOOKING_COLUMNS)
            .filter(bookings::venue_id.eq(venue_id))
            .order((bookings::booking_date.desc(), timeslots::start_time.desc()))
            .load::<BookingResponse>(conn)?;

        Ok(bookings)
    }

    pub fn can_view(&self, claims: &Claims, conn: &db::Conn) -> Result<bool, ServiceError> {
        if claims.is_admin() || self.user_id == claims.user_id() {
            return Ok(true);
        }

        let venue = Venue::find(self.venue_id, conn)?;

        Ok(venue.owner_id == claims.user_id())
    }

    /// Apply a partial update.
    ///
    /// Status changes are reserved for the venue owner and admins and
    /// have to follow the lifecycle. Time and team edits are reserved
    /// for the booking's player and only while the booking is pending.
    pub fn update(
        id: i64,
        update: UpdateBooking,
        claims: &Claims,
        conn: &db::Conn,
    ) -> Result<Booking, ServiceError> {
        conn.transaction::<Booking, ServiceError, _>(|| {
            let mut booking = Booking::find(id, conn)?;
            let venue = Venue::find(booking.venue_id, conn)?;

            let manages_venue = venue.is_owner(claims);
            let owns_booking = booking.user_id == claims.user_id();

            if !manages_venue && !owns_booking {
                forbidden!("you can only modify your own bookings or bookings at your venues");
            }

            let current = booking.parsed_status()?;

            if let Some(status) = update.status.as_deref() {
                let target = Status::parse(status).ok_or_else(|| {
                    ServiceError::BadRequest(format!("unknown booking status: {}", status))
                })?;

                if !manages_venue {
                    forbidden!("only the venue owner or an admin can change the booking status");
                }

                if !current.can_transition(target) {
                    conflict!(format!("a {} booking cannot become {}", current, target));
                }

                booking = diesel::update(&booking)
                    .set(bookings::status.eq(target.to_string()))
                    .get_result(conn)?;

                if target == Status::Cancelled {
                    Timeslot::set_available(booking.timeslot_id, true, conn)?;
                }
            }

            let edits_times = update.start_time.is_some() || update.end_time.is_some();

            if edits_times || update.team_id.is_some() {
                if !owns_booking {
                    forbidden!("only the booking's player can edit its details");
                }

                if current != Status::Pending {
                    conflict!("only pending bookings can be edited");
                }

                if let Some(team_id) = update.team_id {
                    booking = diesel::update(&booking)
                        .set(bookings::team_id.eq(team_id))
                        .get_result(conn)?;
                }

                if edits_times {
                    let slot = Timeslot::find(booking.timeslot_id, conn)?;
                    let start = update.start_time.unwrap_or(slot.start_time);
                    let end = update.end_time.unwrap_or(slot.end_time);

                    if end <= start {
                        bad_request!("the end time has to come after the start time");
                    }

                    let price = slot_price(venue.price_per_hour, start, end);

                    diesel::update(&slot)
                        .set((
                            timeslots::start_time.eq(start),
                            timeslots::end_time.eq(end),
                            timeslots::price.eq(price),
                        ))
                        .execute(conn)?;

                    booking = diesel::update(&booking)
                        .set(bookings::total_amount.eq(price))
                        .get_result(conn)?;
                }
            }

            Ok(booking)
        })
    }

    /// Cancel a booking and free its slot.
    ///
    /// Cancelling twice is a no-op, completed bookings stay completed.
    pub fn cancel(id: i64, claims: &Claims, conn: &db::Conn) -> Result<Booking, ServiceError> {
        conn.transaction::<Booking, ServiceError, _>(|| {
            let booking = Booking::find(id, conn)?;

            if !booking.can_view(claims, conn)? {
                forbidden!("you can only cancel your own bookings or bookings at your venues");
            }

            if !booking.parsed_status()?.cancellable()? {
                return Ok(booking);
            }

            let booking: Booking = diesel::update(&booking)
                .set(bookings::status.eq(Status::Cancelled.to_string()))
                .get_result(conn)?;

            Timeslot::set_available(booking.timeslot_id, true, conn)?;

            Ok(booking)
        })
    }

    pub fn set_status(&self, status: Status, conn: &db::Conn) -> Result<Booking, ServiceError> {
        let booking = diesel::update(self)
            .set(bookings::status.eq(status.to_string()))
            .get_result(conn)?;

        Ok(booking)
    }

    pub fn count(conn: &db::Conn) -> Result<i64, ServiceError> {
        let count = bookings::table.count().get_result(conn)?;

        Ok(count)
    }

    pub fn active_count(conn: &db::Conn) -> Result<i64, ServiceError> {
        let count = bookings::table
            .filter(bookings::status.eq_any(vec![
                Status::Pending.to_string(),
                Status::Confirmed.to_string(),
            ]))
            .count()
            .get_result(conn)?;

        Ok(count)
    }
}

impl crate::validator::Validate<NewBooking> for NewBooking {
    fn validate(&self) -> Result<(), ServiceError> {
        if self.end_time <= self.start_time {
            bad_request!("the end time has to come after the start time");
        }

        let starts_at = self.booking_date.and_time(self.start_time);

        if starts_at <= Local::now().naive_local() {
            bad_request!("bookings have to be for a future date and time");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::Validator;
    use chrono::Duration;

    fn booking(status: Status) -> Booking {
        Booking {
            id: 1,
            user_id: 4,
            venue_id: 1,
            timeslot_id: 1,
            team_id: None,
            booking_date: NaiveDate::from_ymd(2026, 9, 12),
            total_amount: 220,
            status: status.to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn lifecycle_transitions() {
        assert!(Status::Pending.can_transition(Status::Confirmed));
        assert!(Status::Confirmed.can_transition(Status::Completed));
        assert!(Status::Pending.can_transition(Status::Cancelled));
        assert!(Status::Confirmed.can_transition(Status::Cancelled));

        assert!(!Status::Pending.can_transition(Status::Completed));
        assert!(!Status::Completed.can_transition(Status::Cancelled));
        assert!(!Status::Cancelled.can_transition(Status::Pending));
        assert!(!Status::Completed.can_transition(Status::Confirmed));
    }

    #[test]
    fn completed_bookings_cannot_be_cancelled() {
        match Status::Completed.cancellable().unwrap_err() {
            ServiceError::Conflict(message) => assert!(message.contains("completed")),
            other => panic!("expected a conflict, got {:?}", other),
        }
    }

    #[test]
    fn cancelling_twice_is_a_noop() {
        assert!(Status::Pending.cancellable().unwrap());
        assert!(Status::Confirmed.cancellable().unwrap());
        assert_eq!(Status::Cancelled.cancellable().unwrap(), false);
    }

    #[test]
    fn terminal_states() {
        assert!(Status::Completed.is_terminal());
        assert!(Status::Cancelled.is_terminal());
        assert!(!Status::Pending.is_terminal());
        assert!(!Status::Confirmed.is_terminal());
    }

    #[test]
    fn status_roundtrip() {
        for status in &[
            Status::Pending,
            Status::Confirmed,
            Status::Cancelled,
            Status::Completed,
        ] {
            assert_eq!(Status::parse(&status.to_string()), Some(*status));
        }

        assert_eq!(Status::parse("Paid"), None);

        let booking = booking(Status::Confirmed);
        assert_eq!(booking.parsed_status().unwrap(), Status::Confirmed);
    }

    #[test]
    fn price_is_pro_rated_to_the_minute() {
        let start = NaiveTime::from_hms(10, 0, 0);

        // two hours at 200/h
        assert_eq!(slot_price(200, start, NaiveTime::from_hms(12, 0, 0)), 400);
        // 90 minutes at 200/h
        assert_eq!(slot_price(200, start, NaiveTime::from_hms(11, 30, 0)), 300);
        // unset rate falls back to the default
        assert_eq!(
            slot_price(0, start, NaiveTime::from_hms(11, 0, 0)),
            DEFAULT_HOURLY_RATE
        );
    }

    #[test]
    fn bookings_have_to_start_in_the_future() {
        let yesterday = Local::now().naive_local() - Duration::days(1);

        let stale = NewBooking {
            venue_id: 1,
            booking_date: yesterday.date(),
            start_time: NaiveTime::from_hms(10, 0, 0),
            end_time: NaiveTime::from_hms(11, 0, 0),
            team_id: None,
        };

        assert!(Validator::new(stale).validate().is_err());

        let tomorrow = Local::now().naive_local() + Duration::days(1);

        let fresh = NewBooking {
            venue_id: 1,
            booking_date: tomorrow.date(),
            start_time: NaiveTime::from_hms(10, 0, 0),
            end_time: NaiveTime::from_hms(11, 0, 0),
            team_id: None,
        };

        assert!(Validator::new(fresh).validate().is_ok());
    }

    #[test]
    fn inverted_time_windows_are_refused() {
        let tomorrow = Local::now().naive_local() + Duration::days(1);

        let inverted = NewBooking {
            venue_id: 1,
            booking_date: tomorrow.date(),
            start_time: NaiveTime::from_hms(11, 0, 0),
            end_time: NaiveTime::from_hms(10, 0, 0),
            team_id: None,
        };

        assert!(Validator::new(inverted).validate().is_err());
    }
}
