use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use diesel::prelude::*;

use crate::auth::Claims;
use crate::db;
use crate::errors::ServiceError;
use crate::schema::{matches, teams, venues};
use crate::teams::Team;
use crate::venues::Venue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    Scheduled,
    Ongoing,
    Completed,
    Cancelled,
}

impl MatchStatus {
    pub fn parse(status: &str) -> Option<MatchStatus> {
        match status {
            "Scheduled" => Some(MatchStatus::Scheduled),
            "Ongoing" => Some(MatchStatus::Ongoing),
            "Completed" => Some(MatchStatus::Completed),
            "Cancelled" => Some(MatchStatus::Cancelled),
            _ => None,
        }
    }

    pub fn can_transition(self, to: MatchStatus) -> bool {
        match (self, to) {
            (MatchStatus::Scheduled, MatchStatus::Ongoing) => true,
            (MatchStatus::Scheduled, MatchStatus::Completed) => true,
            (MatchStatus::Scheduled, MatchStatus::Cancelled) => true,
            (MatchStatus::Ongoing, MatchStatus::Completed) => true,
            (MatchStatus::Ongoing, MatchStatus::Cancelled) => true,
            _ => false,
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MatchStatus::Scheduled => write!(f, "Scheduled"),
            MatchStatus::Ongoing => write!(f, "Ongoing"),
            MatchStatus::Completed => write!(f, "Completed"),
            MatchStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

#[derive(Debug, Serialize, Queryable, Identifiable)]
#[table_name = "matches"]
pub struct Match {
    pub id: i64,
    pub team_a: i64,
    pub team_b: Option<i64>,
    pub opponent_name: Option<String>,
    pub venue_id: i64,
    pub match_date: NaiveDate,
    pub start_time: NaiveTime,
    pub score_a: Option<i32>,
    pub score_b: Option<i32>,
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMatch {
    pub team_a: i64,
    pub team_b: Option<i64>,
    pub opponent_name: Option<String>,
    pub venue_id: i64,
    pub match_date: NaiveDate,
    pub start_time: NaiveTime,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMatch {
    pub score_a: Option<i32>,
    pub score_b: Option<i32>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MatchFilter {
    pub team_id: Option<i64>,
    pub venue_id: Option<i64>,
    pub status: Option<String>,
}

impl Match {
    pub fn find(id: i64, conn: &db::Conn) -> Result<Match, ServiceError> {
        let game = matches::table.filter(matches::id.eq(id)).first(conn)?;

        Ok(game)
    }

    pub fn find_all(filter: MatchFilter, conn: &db::Conn) -> Result<Vec<Match>, ServiceError> {
        let mut query = matches::table
            .order((matches::match_date.desc(), matches::start_time.desc()))
            .into_boxed();

        if let Some(team_id) = filter.team_id {
            query = query.filter(
                matches::team_a
                    .eq(team_id)
                    .or(matches::team_b.eq(team_id)),
            );
        }

        if let Some(venue_id) = filter.venue_id {
            query = query.filter(matches::venue_id.eq(venue_id));
        }

        if let Some(status) = filter.status {
            query = query.filter(matches::status.eq(status));
        }

        let games = query.load(conn)?;

        Ok(games)
    }

    pub fn parsed_status(&self) -> Result<MatchStatus, ServiceError> {
        MatchStatus::parse(&self.status).ok_or_else(|| {
            error!("match {} carries unknown status {}", self.id, self.status);
            ServiceError::InternalServerError
        })
    }

    /// only the challenging team's captain can schedule on its behalf
    pub fn create(game: NewMatch, claims: &Claims, conn: &db::Conn) -> Result<Match, ServiceError> {
        let team = Team::find(game.team_a, conn)?;

        if !team.is_captain(claims) {
            forbidden!("only the team captain can schedule matches for a team");
        }

        // both teams and the venue have to exist
        Venue::find(game.venue_id, conn)?;

        if let Some(team_b) = game.team_b {
            let exists = teams::table
                .filter(teams::id.eq(team_b))
                .select(teams::id)
                .first::<i64>(conn)
                .optional()?;

            if exists.is_none() {
                not_found!();
            }
        }

        let game = diesel::insert_into(matches::table)
            .values((
                matches::team_a.eq(game.team_a),
                matches::team_b.eq(game.team_b),
                matches::opponent_name.eq(game.opponent_name),
                matches::venue_id.eq(game.venue_id),
                matches::match_date.eq(game.match_date),
                matches::start_time.eq(game.start_time),
                matches::status.eq(MatchStatus::Scheduled.to_string()),
            ))
            .get_result(conn)?;

        Ok(game)
    }

    pub fn update(
        id: i64,
        update: UpdateMatch,
        claims: &Claims,
        conn: &db::Conn,
    ) -> Result<Match, ServiceError> {
        let mut game = Match::find(id, conn)?;
        let team = Team::find(game.team_a, conn)?;

        if !team.is_captain(claims) {
            forbidden!("only the team captain can update a match");
        }

        if let Some(status) = update.status.as_deref() {
            let target = MatchStatus::parse(status).ok_or_else(|| {
                ServiceError::BadRequest(format!("unknown match status: {}", status))
            })?;

            let current = game.parsed_status()?;

            if !current.can_transition(target) {
                conflict!(format!("a {} match cannot become {}", current, target));
            }

            game = diesel::update(&game)
                .set(matches::status.eq(target.to_string()))
                .get_result(conn)?;
        }

        if update.score_a.is_some() || update.score_b.is_some() {
            game = diesel::update(&game)
                .set((
                    matches::score_a.eq(update.score_a.or(game.score_a)),
                    matches::score_b.eq(update.score_b.or(game.score_b)),
                ))
                .get_result(conn)?;
        }

        Ok(game)
    }

    pub fn delete(id: i64, claims: &Claims, conn: &db::Conn) -> Result<(), ServiceError> {
        let game = Match::find(id, conn)?;
        let team = Team::find(game.team_a, conn)?;

        if !team.is_captain(claims) {
            forbidden!("only the team captain can remove a match");
        }

        diesel::delete(&game).execute(conn)?;

        Ok(())
    }
}

impl crate::validator::Validate<NewMatch> for NewMatch {
    fn validate(&self) -> Result<(), ServiceError> {
        let named_opponent = self
            .opponent_name
            .as_ref()
            .map(|name| !name.trim().is_empty())
            .unwrap_or(false);

        if self.team_b.is_none() && !named_opponent {
            bad_request!("a match needs an opposing team or a named opponent");
        }

        if self.team_b == Some(self.team_a) {
            bad_request!("a team cannot play against itself");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::Validator;

    fn game() -> NewMatch {
        NewMatch {
            team_a: 1,
            team_b: Some(2),
            opponent_name: None,
            venue_id: 1,
            match_date: NaiveDate::from_ymd(2026, 9, 20),
            start_time: NaiveTime::from_hms(18, 0, 0),
        }
    }

    #[test]
    fn needs_an_opponent() {
        let mut invalid = game();
        invalid.team_b = None;

        assert!(Validator::new(invalid.clone()).validate().is_err());

        invalid.opponent_name = Some(String::from("Baner Strikers"));
        assert!(Validator::new(invalid).validate().is_ok());
    }

    #[test]
    fn cannot_play_itself() {
        let mut invalid = game();
        invalid.team_b = Some(invalid.team_a);

        assert!(Validator::new(invalid).validate().is_err());
    }

    #[test]
    fn lifecycle_transitions() {
        assert!(MatchStatus::Scheduled.can_transition(MatchStatus::Ongoing));
        assert!(MatchStatus::Scheduled.can_transition(MatchStatus::Completed));
        assert!(MatchStatus::Ongoing.can_transition(MatchStatus::Completed));
        assert!(MatchStatus::Scheduled.can_transition(MatchStatus::Cancelled));

        assert!(!MatchStatus::Completed.can_transition(MatchStatus::Ongoing));
        assert!(!MatchStatus::Cancelled.can_transition(MatchStatus::Scheduled));
    }
}
