table! {
    roles (id) {
        id -> Int4,
        role_name -> Varchar,
    }
}

table! {
    users (id) {
        id -> Int8,
        name -> Varchar,
        email -> Varchar,
        password -> Varchar,
        phone_number -> Varchar,
        gender -> Nullable<Varchar>,
        address -> Nullable<Varchar>,
        role_id -> Int4,
        created_at -> Nullable<Timestamptz>,
        updated_at -> Nullable<Timestamptz>,
    }
}

table! {
    sports (id) {
        id -> Int8,
        sport_name -> Varchar,
        description -> Nullable<Text>,
        created_at -> Nullable<Timestamptz>,
    }
}

table! {
    venues (id) {
        id -> Int8,
        venue_name -> Varchar,
        address -> Varchar,
        city -> Varchar,
        owner_id -> Int8,
        sport_id -> Int8,
        price_per_hour -> Int8,
        created_at -> Nullable<Timestamptz>,
        updated_at -> Nullable<Timestamptz>,
    }
}

table! {
    timeslots (id) {
        id -> Int8,
        venue_id -> Int8,
        slot_date -> Date,
        start_time -> Time,
        end_time -> Time,
        price -> Int8,
        is_available -> Bool,
    }
}

table! {
    bookings (id) {
        id -> Int8,
        user_id -> Int8,
        venue_id -> Int8,
        timeslot_id -> Int8,
        team_id -> Nullable<Int8>,
        booking_date -> Date,
        total_amount -> Int8,
        status -> Varchar,
        created_at -> Nullable<Timestamptz>,
        updated_at -> Nullable<Timestamptz>,
    }
}

table! {
    payments (id) {
        id -> Int8,
        booking_id -> Int8,
        amount -> Int8,
        method -> Varchar,
        status -> Varchar,
        paid_at -> Nullable<Timestamptz>,
        created_at -> Nullable<Timestamptz>,
    }
}

table! {
    teams (id) {
        id -> Int8,
        team_name -> Varchar,
        sport_id -> Int8,
        captain_id -> Int8,
        created_at -> Nullable<Timestamptz>,
    }
}

table! {
    team_members (team_id, user_id) {
        team_id -> Int8,
        user_id -> Int8,
        joined_at -> Nullable<Timestamptz>,
    }
}

table! {
    matches (id) {
        id -> Int8,
        team_a -> Int8,
        team_b -> Nullable<Int8>,
        opponent_name -> Nullable<Varchar>,
        venue_id -> Int8,
        match_date -> Date,
        start_time -> Time,
        score_a -> Nullable<Int4>,
        score_b -> Nullable<Int4>,
        status -> Varchar,
    }
}

table! {
    feedback (id) {
        id -> Int8,
        user_id -> Int8,
        venue_id -> Int8,
        rating -> Int2,
        comment -> Nullable<Text>,
        created_at -> Nullable<Timestamptz>,
    }
}

table! {
    notifications (id) {
        id -> Int8,
        user_id -> Int8,
        message -> Varchar,
        is_read -> Bool,
        created_at -> Nullable<Timestamptz>,
    }
}

table! {
    audit_log (id) {
        id -> Int8,
        user_id -> Nullable<Int8>,
        action -> Varchar,
        table_name -> Varchar,
        record_id -> Nullable<Int8>,
        details -> Nullable<Text>,
        created_at -> Nullable<Timestamptz>,
    }
}

table! {
    user_permissions (role_id, table_name) {
        role_id -> Int4,
        table_name -> Varchar,
        can_select -> Bool,
        can_insert -> Bool,
        can_update -> Bool,
        can_delete -> Bool,
    }
}

joinable!(users -> roles (role_id));
joinable!(venues -> users (owner_id));
joinable!(venues -> sports (sport_id));
joinable!(timeslots -> venues (venue_id));
joinable!(bookings -> users (user_id));
joinable!(bookings -> venues (venue_id));
joinable!(bookings -> timeslots (timeslot_id));
joinable!(bookings -> teams (team_id));
joinable!(payments -> bookings (booking_id));
joinable!(teams -> sports (sport_id));
joinable!(teams -> users (captain_id));
joinable!(team_members -> teams (team_id));
joinable!(team_members -> users (user_id));
joinable!(matches -> venues (venue_id));
joinable!(feedback -> users (user_id));
joinable!(feedback -> venues (venue_id));
joinable!(notifications -> users (user_id));
joinable!(user_permissions -> roles (role_id));

allow_tables_to_appear_in_same_query!(
    roles,
    users,
    sports,
    venues,
    timeslots,
    bookings,
    payments,
    teams,
    team_members,
    matches,
    feedback,
    notifications,
    audit_log,
    user_permissions,
);
