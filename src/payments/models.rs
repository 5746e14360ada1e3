use std::fmt;

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::auth::Claims;
use crate::bookings::{Booking, Status, Timeslot};
use crate::db;
use crate::errors::ServiceError;
use crate::schema::payments;
use crate::venues::Venue;

const DEFAULT_METHOD: &str = "Cash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn parse(status: &str) -> Option<PaymentStatus> {
        match status {
            "Pending" => Some(PaymentStatus::Pending),
            "Completed" => Some(PaymentStatus::Completed),
            "Failed" => Some(PaymentStatus::Failed),
            "Refunded" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }

    /// only money that actually arrived can flow back
    pub fn refundable(self) -> bool {
        self == PaymentStatus::Completed
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "Pending"),
            PaymentStatus::Completed => write!(f, "Completed"),
            PaymentStatus::Failed => write!(f, "Failed"),
            PaymentStatus::Refunded => write!(f, "Refunded"),
        }
    }
}

#[derive(Debug, Serialize, Queryable, Identifiable)]
pub struct Payment {
    pub id: i64,
    pub booking_id: i64,
    pub amount: i64,
    pub method: String,
    pub status: String,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct ProcessPayment {
    pub method: Option<String>,
}

impl Payment {
    pub fn find(id: i64, conn: &db::Conn) -> Result<Payment, ServiceError> {
        let payment = payments::table.filter(payments::id.eq(id)).first(conn)?;

        Ok(payment)
    }

    pub fn find_by_booking(
        booking_id: i64,
        conn: &db::Conn,
    ) -> Result<Option<Payment>, ServiceError> {
        let payment = payments::table
            .filter(payments::booking_id.eq(booking_id))
            .first(conn)
            .optional()?;

        Ok(payment)
    }

    pub fn find_all(conn: &db::Conn) -> Result<Vec<Payment>, ServiceError> {
        let payments = payments::table.order(payments::id.desc()).load(conn)?;

        Ok(payments)
    }

    pub fn parsed_status(&self) -> Result<PaymentStatus, ServiceError> {
        PaymentStatus::parse(&self.status).ok_or_else(|| {
            error!("payment {} carries unknown status {}", self.id, self.status);
            ServiceError::InternalServerError
        })
    }

    /// every booking starts out with an unpaid cash payment attached
    pub fn create_pending(
        booking_id: i64,
        amount: i64,
        conn: &db::Conn,
    ) -> Result<Payment, ServiceError> {
        let payment = diesel::insert_into(payments::table)
            .values((
                payments::booking_id.eq(booking_id),
                payments::amount.eq(amount),
                payments::method.eq(DEFAULT_METHOD),
                payments::status.eq(PaymentStatus::Pending.to_string()),
            ))
            .get_result(conn)?;

        Ok(payment)
    }

    /// Settle the payment for a booking and confirm the booking.
    ///
    /// Processing twice is a conflict, the money already moved.
    pub fn process(
        booking_id: i64,
        message: ProcessPayment,
        claims: &Claims,
        conn: &db::Conn,
    ) -> Result<Payment, ServiceError> {
        conn.transaction::<Payment, ServiceError, _>(|| {
            let booking = Booking::find(booking_id, conn)?;

            if booking.user_id != claims.user_id() && !claims.is_admin() {
                forbidden!("you can only pay for your own bookings");
            }

            let booking_status = booking.parsed_status()?;
            let existing = Payment::find_by_booking(booking.id, conn)?;

            process_guard(
                booking_status,
                existing
                    .as_ref()
                    .map(|payment| payment.parsed_status())
                    .transpose()?,
            )?;

            let method = message
                .method
                .unwrap_or_else(|| DEFAULT_METHOD.to_string());

            let payment = match existing {
                Some(payment) => {
                    diesel::update(&payment)
                        .set((
                            payments::status.eq(PaymentStatus::Completed.to_string()),
                            payments::method.eq(method),
                            payments::paid_at.eq(Utc::now()),
                        ))
                        .get_result::<Payment>(conn)?
                }
                None => diesel::insert_into(payments::table)
                    .values((
                        payments::booking_id.eq(booking.id),
                        payments::amount.eq(booking.total_amount),
                        payments::method.eq(method),
                        payments::status.eq(PaymentStatus::Completed.to_string()),
                        payments::paid_at.eq(Utc::now()),
                    ))
                    .get_result::<Payment>(conn)?,
            };

            if booking_status == Status::Pending {
                booking.set_status(Status::Confirmed, conn)?;
            }

            Ok(payment)
        })
    }

    /// Refund a settled payment.
    ///
    /// The booking is cancelled and its slot opens up again; bookings
    /// that already reached a terminal state keep their status.
    pub fn refund(payment_id: i64, conn: &db::Conn) -> Result<Payment, ServiceError> {
        conn.transaction::<Payment, ServiceError, _>(|| {
            let payment = Payment::find(payment_id, conn)?;

            if !payment.parsed_status()?.refundable() {
                conflict!(format!("a {} payment cannot be refunded", payment.status));
            }

            let payment: Payment = diesel::update(&payment)
                .set(payments::status.eq(PaymentStatus::Refunded.to_string()))
                .get_result(conn)?;

            let booking = Booking::find(payment.booking_id, conn)?;

            if !booking.parsed_status()?.is_terminal() {
                let booking = booking.set_status(Status::Cancelled, conn)?;
                Timeslot::set_available(booking.timeslot_id, true, conn)?;
            }

            Ok(payment)
        })
    }

    /// whether the caller paid for it, hosts it or moderates everything
    pub fn can_view(&self, claims: &Claims, conn: &db::Conn) -> Result<bool, ServiceError> {
        if claims.is_admin() {
            return Ok(true);
        }

        let booking = Booking::find(self.booking_id, conn)?;

        if booking.user_id == claims.user_id() {
            return Ok(true);
        }

        let venue = Venue::find(booking.venue_id, conn)?;

        Ok(venue.owner_id == claims.user_id())
    }

    pub fn completed_revenue(conn: &db::Conn) -> Result<i64, ServiceError> {
        use diesel::dsl::sql;
        use diesel::sql_types::{BigInt, Nullable};

        let revenue: Option<i64> = payments::table
            .filter(payments::status.eq(PaymentStatus::Completed.to_string()))
            .select(sql::<Nullable<BigInt>>("SUM(amount)::BIGINT"))
            .first(conn)?;

        Ok(revenue.unwrap_or(0))
    }
}

/// preconditions for settling a booking's payment
fn process_guard(
    booking: Status,
    payment: Option<PaymentStatus>,
) -> Result<(), ServiceError> {
    if !matches!(booking, Status::Pending | Status::Confirmed) {
        return Err(ServiceError::Conflict(format!(
            "a {} booking cannot be paid for",
            booking
        )));
    }

    if let Some(status) = payment {
        if status != PaymentStatus::Pending {
            return Err(ServiceError::Conflict(
                "the payment for this booking was already processed".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(status: PaymentStatus) -> Payment {
        Payment {
            id: 1,
            booking_id: 1,
            amount: 220,
            method: String::from("Cash"),
            status: status.to_string(),
            paid_at: None,
            created_at: None,
        }
    }

    #[test]
    fn only_completed_payments_are_refundable() {
        assert!(PaymentStatus::Completed.refundable());
        assert!(!PaymentStatus::Pending.refundable());
        assert!(!PaymentStatus::Failed.refundable());
        assert!(!PaymentStatus::Refunded.refundable());
    }

    #[test]
    fn processing_twice_is_a_conflict() {
        assert!(process_guard(Status::Pending, Some(PaymentStatus::Pending)).is_ok());
        assert!(process_guard(Status::Confirmed, None).is_ok());

        match process_guard(Status::Pending, Some(PaymentStatus::Completed)).unwrap_err() {
            ServiceError::Conflict(message) => assert!(message.contains("already processed")),
            other => panic!("expected a conflict, got {:?}", other),
        }
    }

    #[test]
    fn settled_bookings_cannot_be_paid_for() {
        assert!(process_guard(Status::Cancelled, None).is_err());
        assert!(process_guard(Status::Completed, Some(PaymentStatus::Pending)).is_err());
    }

    #[test]
    fn status_roundtrip() {
        for status in &[
            PaymentStatus::Pending,
            PaymentStatus::Completed,
            PaymentStatus::Failed,
            PaymentStatus::Refunded,
        ] {
            assert_eq!(PaymentStatus::parse(&status.to_string()), Some(*status));
        }

        assert_eq!(PaymentStatus::parse("Settled"), None);

        let payment = payment(PaymentStatus::Refunded);
        assert_eq!(payment.parsed_status().unwrap(), PaymentStatus::Refunded);
    }
}
