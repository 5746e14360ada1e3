use diesel::prelude::*;
use diesel::sql_types::{BigInt, Text};

use crate::bookings::Booking;
use crate::db;
use crate::errors::ServiceError;
use crate::payments::Payment;
use crate::teams::Team;
use crate::users::User;
use crate::venues::Venue;

#[derive(Debug, Serialize)]
pub struct PlatformReport {
    pub users: i64,
    pub venues: i64,
    pub teams: i64,
    pub bookings: i64,
    pub active_bookings: i64,
    pub revenue: i64,
}

impl PlatformReport {
    pub fn generate(conn: &db::Conn) -> Result<PlatformReport, ServiceError> {
        Ok(PlatformReport {
            users: User::count(conn)?,
            venues: Venue::count(conn)?,
            teams: Team::count(conn)?,
            bookings: Booking::count(conn)?,
            active_bookings: Booking::active_count(conn)?,
            revenue: Payment::completed_revenue(conn)?,
        })
    }
}

/// per-venue booking volume and settled revenue for one owner
#[derive(Debug, Serialize, QueryableByName)]
pub struct VenueRevenue {
    #[sql_type = "BigInt"]
    pub venue_id: i64,
    #[sql_type = "Text"]
    pub venue_name: String,
    #[sql_type = "BigInt"]
    pub bookings: i64,
    #[sql_type = "BigInt"]
    pub revenue: i64,
}

impl VenueRevenue {
    pub fn for_owner(owner_id: i64, conn: &db::Conn) -> Result<Vec<VenueRevenue>, ServiceError> {
        let report = diesel::sql_query(
            "SELECT v.id AS venue_id, \
                    v.venue_name, \
                    COUNT(b.id) AS bookings, \
                    COALESCE(SUM(p.amount) FILTER (WHERE p.status = 'Completed'), 0) AS revenue \
             FROM venues v \
             LEFT JOIN bookings b ON b.venue_id = v.id \
             LEFT JOIN payments p ON p.booking_id = b.id \
             WHERE v.owner_id = $1 \
             GROUP BY v.id, v.venue_name \
             ORDER BY v.venue_name",
        )
        .bind::<BigInt, _>(owner_id)
        .load(conn)?;

        Ok(report)
    }
}
