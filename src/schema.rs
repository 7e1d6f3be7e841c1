table! {
    appointments (id) {
        id -> Integer,
        client_id -> Integer,
        procedure_id -> Integer,
        consultation_type -> Text,
        description -> Text,
        professional_id -> Integer,
        date -> Date,
        time -> Time,
        status -> Text,
    }
}

table! {
    clients (id) {
        id -> Integer,
        name -> Text,
        phone -> Text,
        email -> Text,
        birth_date -> Date,
    }
}

table! {
    notification_deliveries (id) {
        id -> Integer,
        kind -> Text,
        recipient -> Text,
        status -> Text,
        attempts -> Integer,
        error -> Nullable<Text>,
        appointment_id -> Nullable<Integer>,
        client_id -> Nullable<Integer>,
        created_at -> Timestamp,
    }
}

table! {
    procedures (id) {
        id -> Integer,
        name -> Text,
        price -> Double,
        description -> Nullable<Text>,
    }
}

table! {
    professionals (id) {
        id -> Integer,
        name -> Text,
        national_id -> Text,
        license_number -> Text,
        license_type -> Text,
        email -> Text,
        phone -> Text,
        specialty -> Text,
    }
}

table! {
    reminder_jobs (id) {
        id -> Integer,
        appointment_id -> Integer,
        fire_at -> Timestamp,
        fired -> Bool,
        fired_at -> Nullable<Timestamp>,
    }
}

joinable!(appointments -> clients (client_id));
joinable!(appointments -> procedures (procedure_id));
joinable!(appointments -> professionals (professional_id));
joinable!(reminder_jobs -> appointments (appointment_id));

allow_tables_to_appear_in_same_query!(
    appointments,
    clients,
    notification_deliveries,
    procedures,
    professionals,
    reminder_jobs,
);
