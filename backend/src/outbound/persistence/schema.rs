//! Diesel table definitions mirroring `backend/migrations`.
//!
//! Enumerations are stored as constrained `VARCHAR` columns and converted
//! through the domain `FromStr` impls when rows are read.

diesel::table! {
    users (id) {
        id -> Uuid,
        email -> Varchar,
        role -> Varchar,
        service_role -> Varchar,
        first_name -> Nullable<Varchar>,
        last_name -> Nullable<Varchar>,
        phone_number -> Nullable<Varchar>,
        bio -> Nullable<Text>,
        address -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// SHA-256 digests of issued bearer tokens.
    api_tokens (token_digest) {
        token_digest -> Varchar,
        user_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    bookings (id) {
        id -> Uuid,
        requester_id -> Uuid,
        provider_id -> Nullable<Uuid>,
        address -> Text,
        service_type -> Varchar,
        booking_type -> Varchar,
        description -> Text,
        start_date -> Date,
        end_date -> Date,
        start_time -> Timestamptz,
        end_time -> Timestamptz,
        total_price -> Float8,
        actual_price -> Float8,
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    booking_invitations (booking_id, invitee_id) {
        booking_id -> Uuid,
        invitee_id -> Uuid,
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only record of provider rejections.
    rejected_bookings (id) {
        id -> Uuid,
        booking_id -> Uuid,
        user_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    notifications (id) {
        id -> Uuid,
        kind -> Varchar,
        user_id -> Uuid,
        booking_id -> Nullable<Uuid>,
        message -> Text,
        seen -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    payments (id) {
        id -> Uuid,
        payment_type -> Varchar,
        booking_id -> Nullable<Uuid>,
        amount -> Float8,
        reference -> Varchar,
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    payment_access_codes (id) {
        id -> Uuid,
        payment_id -> Uuid,
        access_code -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    user_wallets (id) {
        id -> Uuid,
        user_id -> Uuid,
        credits -> Float8,
        debits -> Float8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    service_pricings (id) {
        id -> Uuid,
        service_type -> Varchar,
        rate_per_hour -> Float8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Holds at most one row; `singleton` is unique and always true.
    service_commissions (id) {
        id -> Uuid,
        singleton -> Bool,
        percentage -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    provider_services (id) {
        id -> Uuid,
        user_id -> Uuid,
        service_type -> Varchar,
        description -> Text,
        rate_per_hour -> Float8,
        experience_years -> Int4,
        /// Weekly availability document keyed by weekday.
        availability -> Jsonb,
        address -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    service_images (id) {
        id -> Uuid,
        user_id -> Uuid,
        service_type -> Varchar,
        url -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    payout_recipients (user_id) {
        user_id -> Uuid,
        recipient_code -> Varchar,
        account_name -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(api_tokens -> users (user_id));
diesel::joinable!(booking_invitations -> bookings (booking_id));
diesel::joinable!(rejected_bookings -> bookings (booking_id));
diesel::joinable!(notifications -> users (user_id));
diesel::joinable!(payment_access_codes -> payments (payment_id));
diesel::joinable!(user_wallets -> users (user_id));
diesel::joinable!(service_images -> users (user_id));
diesel::joinable!(payout_recipients -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    api_tokens,
    bookings,
    booking_invitations,
    rejected_bookings,
    notifications,
    payments,
    payment_access_codes,
    user_wallets,
    service_pricings,
    service_commissions,
    provider_services,
    service_images,
    payout_recipients,
);
