use chrono::{DateTime, Utc};
use diesel::prelude::*;
use regex::Regex;

use crate::auth::Claims;
use crate::db;
use crate::errors::ServiceError;
use crate::schema::{bookings, sports, users, venues};

#[derive(Debug, Serialize, Queryable, Identifiable, Clone)]
pub struct Venue {
    pub id: i64,
    pub venue_name: String,
    pub address: String,
    pub city: String,
    pub owner_id: i64,
    pub sport_id: i64,
    pub price_per_hour: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Insertable)]
#[table_name = "venues"]
pub struct CreateVenue {
    pub venue_name: String,
    pub address: String,
    pub city: Option<String>,
    /// ignored unless an admin creates a venue on an owner's behalf
    #[serde(default)]
    pub owner_id: Option<i64>,
    pub sport_id: i64,
    pub price_per_hour: Option<i64>,
}

#[derive(Debug, Deserialize, AsChangeset)]
#[table_name = "venues"]
pub struct UpdateVenue {
    pub venue_name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub sport_id: Option<i64>,
    pub price_per_hour: Option<i64>,
}

/// the client can query venues with this
#[derive(Debug, Deserialize)]
pub struct VenueFilter {
    /// matches %q% against name, address and city
    pub q: Option<String>,
    pub sport_id: Option<i64>,
    pub owner_id: Option<i64>,
}

#[derive(Serialize, Queryable, Debug)]
pub struct VenueOwner {
    pub id: i64,
    pub name: String,
}

#[derive(Serialize, Queryable, Debug)]
pub struct VenueResponse {
    pub id: i64,
    pub venue_name: String,
    pub address: String,
    pub city: String,
    pub price_per_hour: i64,
    pub sport_name: String,
    pub owner: VenueOwner,
}

impl Venue {
    pub fn find(id: i64, conn: &db::Conn) -> Result<Venue, ServiceError> {
        let venue = venues::table.filter(venues::id.eq(id)).first(conn)?;

        Ok(venue)
    }

    pub fn find_all(
        filter: VenueFilter,
        conn: &db::Conn,
    ) -> Result<Vec<VenueResponse>, ServiceError> {
        let mut query = venues::table
            .inner_join(users::table)
            .inner_join(sports::table)
            .select((
                venues::id,
                venues::venue_name,
                venues::address,
                venues::city,
                venues::price_per_hour,
                sports::sport_name,
                (users::id, users::name),
            ))
            .order(venues::venue_name)
            .into_boxed();

        if let Some(q) = filter.q {
            let pattern = format!("%{}%", q.trim());
            query = query.filter(
                venues::venue_name
                    .ilike(pattern.clone())
                    .or(venues::address.ilike(pattern.clone()))
                    .or(venues::city.ilike(pattern)),
            );
        }

        if let Some(sport_id) = filter.sport_id {
            query = query.filter(venues::sport_id.eq(sport_id));
        }

        if let Some(owner_id) = filter.owner_id {
            query = query.filter(venues::owner_id.eq(owner_id));
        }

        let venues = query.load::<VenueResponse>(conn)?;

        Ok(venues)
    }

    pub fn create(venue: CreateVenue, conn: &db::Conn) -> Result<Venue, ServiceError> {
        let exists = sports::table
            .filter(sports::id.eq(venue.sport_id))
            .select(sports::id)
            .first::<i64>(conn)
            .optional()?;

        if exists.is_none() {
            not_found!();
        }

        let venue = diesel::insert_into(venues::table)
            .values(&venue)
            .get_result(conn)?;

        Ok(venue)
    }

    pub fn update(&self, update: UpdateVenue, conn: &db::Conn) -> Result<Venue, ServiceError> {
        let venue = diesel::update(self).set(&update).get_result(conn)?;

        Ok(venue)
    }

    pub fn delete(&self, conn: &db::Conn) -> Result<(), ServiceError> {
        if self.active_bookings(conn)? > 0 {
            conflict!("this venue still has active bookings");
        }

        diesel::delete(self).execute(conn)?;

        Ok(())
    }

    fn active_bookings(&self, conn: &db::Conn) -> Result<i64, ServiceError> {
        let count = bookings::table
            .filter(bookings::venue_id.eq(self.id))
            .filter(bookings::status.eq_any(vec!["Pending", "Confirmed"]))
            .count()
            .get_result(conn)?;

        Ok(count)
    }

    /// returns true if the user is an admin or owns this venue
    pub fn is_owner(&self, claims: &Claims) -> bool {
        claims.is_admin() || self.owner_id == claims.user_id()
    }

    pub fn count(conn: &db::Conn) -> Result<i64, ServiceError> {
        let count = venues::table.count().get_result(conn)?;

        Ok(count)
    }
}

impl crate::validator::Validate<CreateVenue> for CreateVenue {
    fn validate(&self) -> Result<(), ServiceError> {
        validate_name(&self.venue_name)?;

        if self.address.trim().is_empty() {
            bad_request!("an address is required");
        }

        if let Some(price) = self.price_per_hour {
            if price <= 0 {
                bad_request!("the hourly rate has to be above 0");
            }
        }

        Ok(())
    }
}

impl crate::validator::Validate<UpdateVenue> for UpdateVenue {
    fn validate(&self) -> Result<(), ServiceError> {
        if let Some(name) = self.venue_name.as_ref() {
            validate_name(name)?;
        }

        if let Some(price) = self.price_per_hour {
            if price <= 0 {
                bad_request!("the hourly rate has to be above 0");
            }
        }

        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), ServiceError> {
    let pattern: Regex = Regex::new(r"^[a-zA-Z0-9_-]+( [a-zA-Z0-9_()-]+)*$").unwrap();

    if name.trim().is_empty() {
        bad_request!("name is too short");
    }

    if name.trim().len() > 100 {
        bad_request!("name is too long, maximum 100 characters");
    }

    if !pattern.is_match(name) {
        bad_request!("name can only contain letters, numbers, spaces, '-' and '_'");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::Validator;

    fn venue() -> CreateVenue {
        CreateVenue {
            venue_name: String::from("Deccan Gymkhana Courts"),
            address: String::from("Deccan Gymkhana, Pune"),
            city: None,
            owner_id: None,
            sport_id: 1,
            price_per_hour: Some(250),
        }
    }

    #[test]
    fn valid_venue() {
        assert!(Validator::new(venue()).validate().is_ok());
    }

    #[test]
    fn invalid_venue_names() {
        let mut invalid = venue();
        invalid.venue_name = String::from("<script>alert(1)</script>");
        assert!(Validator::new(invalid.clone()).validate().is_err());

        invalid.venue_name = String::from("");
        assert!(Validator::new(invalid).validate().is_err());
    }

    #[test]
    fn negative_hourly_rate() {
        let mut invalid = venue();
        invalid.price_per_hour = Some(-5);

        assert!(Validator::new(invalid).validate().is_err());
    }

    #[test]
    fn ownership_is_owner_or_admin() {
        let venue = Venue {
            id: 1,
            venue_name: String::from("Deccan Gymkhana Courts"),
            address: String::from("Deccan Gymkhana, Pune"),
            city: String::from("Pune"),
            owner_id: 2,
            sport_id: 1,
            price_per_hour: 250,
            created_at: None,
            updated_at: None,
        };

        let owner = crate::auth::claims::test_claims(2, crate::auth::Role::VenueOwner);
        let stranger = crate::auth::claims::test_claims(7, crate::auth::Role::Player);
        let admin = crate::auth::claims::test_claims(9, crate::auth::Role::Admin);

        assert!(venue.is_owner(&owner));
        assert!(!venue.is_owner(&stranger));
        assert!(venue.is_owner(&admin));
    }
}
