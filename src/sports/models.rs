use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::db;
use crate::errors::ServiceError;
use crate::schema::{sports, venues};

#[derive(Debug, Serialize, Queryable, Identifiable)]
pub struct Sport {
    pub id: i64,
    pub sport_name: String,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Insertable, AsChangeset)]
#[table_name = "sports"]
pub struct NewSport {
    pub sport_name: String,
    pub description: Option<String>,
}

impl Sport {
    pub fn find(id: i64, conn: &db::Conn) -> Result<Sport, ServiceError> {
        let sport = sports::table.filter(sports::id.eq(id)).first(conn)?;

        Ok(sport)
    }

    pub fn find_all(conn: &db::Conn) -> Result<Vec<Sport>, ServiceError> {
        let sports = sports::table.order(sports::sport_name).load(conn)?;

        Ok(sports)
    }

    pub fn exists(id: i64, conn: &db::Conn) -> Result<bool, ServiceError> {
        let found = sports::table
            .filter(sports::id.eq(id))
            .select(sports::id)
            .first::<i64>(conn)
            .optional()?;

        Ok(found.is_some())
    }

    pub fn create(sport: NewSport, conn: &db::Conn) -> Result<Sport, ServiceError> {
        let sport = diesel::insert_into(sports::table)
            .values(&sport)
            .get_result(conn)
            .map_err(|error| match ServiceError::from(error) {
                ServiceError::Conflict(_) => {
                    ServiceError::Conflict("this sport already exists".to_string())
                }
                error => error,
            })?;

        Ok(sport)
    }

    pub fn update(&self, update: NewSport, conn: &db::Conn) -> Result<Sport, ServiceError> {
        let sport = diesel::update(self).set(&update).get_result(conn)?;

        Ok(sport)
    }

    pub fn delete(&self, conn: &db::Conn) -> Result<(), ServiceError> {
        let in_use = venues::table
            .filter(venues::sport_id.eq(self.id))
            .select(venues::id)
            .first::<i64>(conn)
            .optional()?;

        if in_use.is_some() {
            conflict!("this sport is still offered by venues");
        }

        diesel::delete(self).execute(conn)?;

        Ok(())
    }
}

impl crate::validator::Validate<NewSport> for NewSport {
    fn validate(&self) -> Result<(), ServiceError> {
        if self.sport_name.trim().is_empty() {
            bad_request!("a sport name is required");
        }

        if self.sport_name.trim().len() > 50 {
            bad_request!("sport name is too long, maximum 50 characters");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::Validator;

    #[test]
    fn sport_name_required() {
        let sport = NewSport {
            sport_name: String::from("   "),
            description: None,
        };

        assert!(Validator::new(sport).validate().is_err());
    }

    #[test]
    fn valid_sport() {
        let sport = NewSport {
            sport_name: String::from("Badminton"),
            description: Some(String::from("Indoor court, shuttle provided")),
        };

        assert!(Validator::new(sport).validate().is_ok());
    }
}
