use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::auth::Claims;
use crate::db;
use crate::errors::ServiceError;
use crate::schema::{bookings, matches, sports, team_members, teams, users};
use crate::sports::Sport;

#[derive(Debug, Serialize, Queryable, Identifiable)]
pub struct Team {
    pub id: i64,
    pub team_name: String,
    pub sport_id: i64,
    pub captain_id: i64,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTeam {
    pub team_name: String,
    pub sport_id: i64,
}

#[derive(Serialize, Queryable, Debug)]
pub struct TeamCaptain {
    pub id: i64,
    pub name: String,
}

#[derive(Serialize, Queryable, Debug)]
pub struct TeamResponse {
    pub id: i64,
    pub team_name: String,
    pub sport_name: String,
    pub captain: TeamCaptain,
}

#[derive(Serialize, Queryable, Debug)]
pub struct TeamMember {
    pub id: i64,
    pub name: String,
    pub joined_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Debug)]
pub struct TeamDetail {
    #[serde(flatten)]
    pub team: TeamResponse,
    pub members: Vec<TeamMember>,
}

impl Team {
    pub fn find(id: i64, conn: &db::Conn) -> Result<Team, ServiceError> {
        let team = teams::table.filter(teams::id.eq(id)).first(conn)?;

        Ok(team)
    }

    pub fn find_all(conn: &db::Conn) -> Result<Vec<TeamResponse>, ServiceError> {
        let teams = teams::table
            .inner_join(sports::table)
            .inner_join(users::table)
            .select((
                teams::id,
                teams::team_name,
                sports::sport_name,
                (users::id, users::name),
            ))
            .order(teams::team_name)
            .load::<TeamResponse>(conn)?;

        Ok(teams)
    }

    /// every team the user plays in, captained teams included
    pub fn find_for_user(user_id: i64, conn: &db::Conn) -> Result<Vec<TeamResponse>, ServiceError> {
        let memberships = team_members::table
            .filter(team_members::user_id.eq(user_id))
            .select(team_members::team_id);

        let teams = teams::table
            .inner_join(sports::table)
            .inner_join(users::table)
            .select((
                teams::id,
                teams::team_name,
                sports::sport_name,
                (users::id, users::name),
            ))
            .filter(teams::id.eq_any(memberships))
            .order(teams::team_name)
            .load::<TeamResponse>(conn)?;

        Ok(teams)
    }

    pub fn detail(id: i64, conn: &db::Conn) -> Result<TeamDetail, ServiceError> {
        let team = teams::table
            .inner_join(sports::table)
            .inner_join(users::table)
            .select((
                teams::id,
                teams::team_name,
                sports::sport_name,
                (users::id, users::name),
            ))
            .filter(teams::id.eq(id))
            .first::<TeamResponse>(conn)?;

        let members = team_members::table
            .inner_join(users::table)
            .select((users::id, users::name, team_members::joined_at))
            .filter(team_members::team_id.eq(id))
            .order(team_members::joined_at)
            .load::<TeamMember>(conn)?;

        Ok(TeamDetail { team, members })
    }

    /// the captain is on the roster from the start
    pub fn create(team: NewTeam, captain_id: i64, conn: &db::Conn) -> Result<Team, ServiceError> {
        conn.transaction::<Team, ServiceError, _>(|| {
            if !Sport::exists(team.sport_id, conn)? {
                not_found!();
            }

            let team: Team = diesel::insert_into(teams::table)
                .values((
                    teams::team_name.eq(team.team_name.trim()),
                    teams::sport_id.eq(team.sport_id),
                    teams::captain_id.eq(captain_id),
                ))
                .get_result(conn)
                .map_err(|error| match ServiceError::from(error) {
                    ServiceError::Conflict(_) => ServiceError::Conflict(
                        "a team with this name already exists for this sport".to_string(),
                    ),
                    error => error,
                })?;

            diesel::insert_into(team_members::table)
                .values((
                    team_members::team_id.eq(team.id),
                    team_members::user_id.eq(captain_id),
                ))
                .execute(conn)?;

            Ok(team)
        })
    }

    /// returns true if the user is an admin or captains this team
    pub fn is_captain(&self, claims: &Claims) -> bool {
        claims.is_admin() || self.captain_id == claims.user_id()
    }

    pub fn count(conn: &db::Conn) -> Result<i64, ServiceError> {
        let count = teams::table.count().get_result(conn)?;

        Ok(count)
    }

    pub fn is_member(&self, user_id: i64, conn: &db::Conn) -> Result<bool, ServiceError> {
        let membership = team_members::table
            .filter(team_members::team_id.eq(self.id))
            .filter(team_members::user_id.eq(user_id))
            .select(team_members::user_id)
            .first::<i64>(conn)
            .optional()?;

        Ok(membership.is_some())
    }

    pub fn join(&self, user_id: i64, conn: &db::Conn) -> Result<(), ServiceError> {
        if self.is_member(user_id, conn)? {
            conflict!("you are already a member of this team");
        }

        diesel::insert_into(team_members::table)
            .values((
                team_members::team_id.eq(self.id),
                team_members::user_id.eq(user_id),
            ))
            .execute(conn)?;

        Ok(())
    }

    /// captains can't walk out on their own team
    pub fn may_leave(&self, user_id: i64) -> Result<(), ServiceError> {
        if self.captain_id == user_id {
            bad_request!("captains cannot leave their own team, delete it instead");
        }

        Ok(())
    }

    pub fn leave(&self, user_id: i64, conn: &db::Conn) -> Result<(), ServiceError> {
        self.may_leave(user_id)?;

        if !self.is_member(user_id, conn)? {
            not_found!();
        }

        diesel::delete(
            team_members::table
                .filter(team_members::team_id.eq(self.id))
                .filter(team_members::user_id.eq(user_id)),
        )
        .execute(conn)?;

        Ok(())
    }

    pub fn delete(&self, claims: &Claims, conn: &db::Conn) -> Result<(), ServiceError> {
        if !self.is_captain(claims) {
            forbidden!("only the captain or an admin can delete a team");
        }

        let booked = bookings::table
            .filter(bookings::team_id.eq(self.id))
            .filter(bookings::status.eq_any(vec!["Pending", "Confirmed"]))
            .select(bookings::id)
            .first::<i64>(conn)
            .optional()?;

        if booked.is_some() {
            conflict!("this team still has active bookings");
        }

        let playing = matches::table
            .filter(
                matches::team_a
                    .eq(self.id)
                    .or(matches::team_b.eq(Some(self.id))),
            )
            .filter(matches::status.eq_any(vec!["Scheduled", "Ongoing"]))
            .select(matches::id)
            .first::<i64>(conn)
            .optional()?;

        if playing.is_some() {
            conflict!("this team still has matches to play");
        }

        diesel::delete(self).execute(conn)?;

        Ok(())
    }
}

impl crate::validator::Validate<NewTeam> for NewTeam {
    fn validate(&self) -> Result<(), ServiceError> {
        let name = self.team_name.trim();

        if name.is_empty() {
            bad_request!("a team name is required");
        }

        if name.len() > 100 {
            bad_request!("team name is too long, maximum 100 characters");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::Validator;

    #[test]
    fn team_name_required() {
        let team = NewTeam {
            team_name: String::from("  "),
            sport_id: 1,
        };

        assert!(Validator::new(team).validate().is_err());
    }

    #[test]
    fn valid_team() {
        let team = NewTeam {
            team_name: String::from("Kothrud Smashers"),
            sport_id: 1,
        };

        assert!(Validator::new(team).validate().is_ok());
    }

    fn team() -> Team {
        Team {
            id: 1,
            team_name: String::from("Kothrud Smashers"),
            sport_id: 1,
            captain_id: 4,
            created_at: None,
        }
    }

    #[test]
    fn captains_cannot_leave_their_own_team() {
        let team = team();

        match team.may_leave(4).unwrap_err() {
            ServiceError::BadRequest(message) => assert!(message.contains("captains")),
            other => panic!("expected a bad request, got {:?}", other),
        }

        assert!(team.may_leave(5).is_ok());
    }

    #[test]
    fn captaincy_is_captain_or_admin() {
        let team = team();

        let captain = crate::auth::claims::test_claims(4, crate::auth::Role::Player);
        let member = crate::auth::claims::test_claims(5, crate::auth::Role::Player);
        let admin = crate::auth::claims::test_claims(9, crate::auth::Role::Admin);

        assert!(team.is_captain(&captain));
        assert!(!team.is_captain(&member));
        assert!(team.is_captain(&admin));
    }
}
