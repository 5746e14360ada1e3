use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::auth::Claims;
use crate::db;
use crate::errors::ServiceError;
use crate::schema::{feedback, users};
use crate::venues::Venue;

#[derive(Debug, Serialize, Queryable, Identifiable)]
#[table_name = "feedback"]
pub struct Feedback {
    pub id: i64,
    pub user_id: i64,
    pub venue_id: i64,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewFeedback {
    pub venue_id: i64,
    pub rating: i16,
    pub comment: Option<String>,
}

#[derive(Serialize, Queryable, Debug)]
pub struct FeedbackAuthor {
    pub id: i64,
    pub name: String,
}

#[derive(Serialize, Queryable, Debug)]
pub struct FeedbackResponse {
    pub id: i64,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub player: FeedbackAuthor,
}

impl Feedback {
    pub fn find(id: i64, conn: &db::Conn) -> Result<Feedback, ServiceError> {
        let feedback = feedback::table.filter(feedback::id.eq(id)).first(conn)?;

        Ok(feedback)
    }

    pub fn find_for_venue(
        venue_id: i64,
        conn: &db::Conn,
    ) -> Result<Vec<FeedbackResponse>, ServiceError> {
        let feedback = feedback::table
            .inner_join(users::table)
            .select((
                feedback::id,
                feedback::rating,
                feedback::comment,
                feedback::created_at,
                (users::id, users::name),
            ))
            .filter(feedback::venue_id.eq(venue_id))
            .order(feedback::created_at.desc())
            .load::<FeedbackResponse>(conn)?;

        Ok(feedback)
    }

    pub fn create(
        feedback: NewFeedback,
        user_id: i64,
        conn: &db::Conn,
    ) -> Result<Feedback, ServiceError> {
        // surface a 404 for venues that don't exist
        Venue::find(feedback.venue_id, conn)?;

        let feedback = diesel::insert_into(feedback::table)
            .values((
                feedback::user_id.eq(user_id),
                feedback::venue_id.eq(feedback.venue_id),
                feedback::rating.eq(feedback.rating),
                feedback::comment.eq(feedback.comment),
            ))
            .get_result(conn)?;

        Ok(feedback)
    }

    pub fn delete(&self, claims: &Claims, conn: &db::Conn) -> Result<(), ServiceError> {
        if self.user_id != claims.user_id() && !claims.is_admin() {
            forbidden!("you can only remove your own feedback");
        }

        diesel::delete(self).execute(conn)?;

        Ok(())
    }
}

impl crate::validator::Validate<NewFeedback> for NewFeedback {
    fn validate(&self) -> Result<(), ServiceError> {
        if !(1..=5).contains(&self.rating) {
            bad_request!("the rating has to be between 1 and 5");
        }

        if let Some(comment) = self.comment.as_ref() {
            if comment.len() > 1000 {
                bad_request!("the comment is too long, maximum 1000 characters");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::Validator;

    fn feedback(rating: i16) -> NewFeedback {
        NewFeedback {
            venue_id: 1,
            rating,
            comment: Some(String::from("Great turf, floodlights could be brighter")),
        }
    }

    #[test]
    fn ratings_are_one_to_five() {
        assert!(Validator::new(feedback(0)).validate().is_err());
        assert!(Validator::new(feedback(6)).validate().is_err());

        for rating in 1..=5 {
            assert!(Validator::new(feedback(rating)).validate().is_ok());
        }
    }
}
