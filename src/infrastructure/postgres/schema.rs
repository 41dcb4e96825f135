// Kept in sync by hand with the DDL in schema_setup.rs.

diesel::table! {
    inscricoes (id) {
        id -> Uuid,
        full_name -> Text,
        gender -> Text,
        birth_date -> Date,
        whatsapp -> Text,
        emergency_contact -> Text,
        address -> Text,
        quote -> Text,
        guardian_name -> Nullable<Text>,
        cpf -> Text,
        document_blob -> Bytea,
        document_mime -> Text,
        photo_blob -> Bytea,
        photo_mime -> Text,
        devotion_photo_blob -> Bytea,
        devotion_photo_mime -> Text,
        payment_id -> Nullable<Text>,
        qr_code -> Nullable<Text>,
        qr_base64 -> Nullable<Text>,
        ticket_url -> Nullable<Text>,
        status -> Text,
        paid_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    users (id) {
        id -> Uuid,
        full_name -> Text,
        email -> Text,
        password_hash -> Text,
        cpf -> Text,
        city -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    cart_items (id) {
        id -> Uuid,
        user_id -> Uuid,
        product_id -> Text,
        name -> Text,
        size -> Text,
        qty -> Int4,
        price_minor -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    orders (id) {
        id -> Uuid,
        user_id -> Uuid,
        total_minor -> Int8,
        payment_id -> Nullable<Text>,
        qr_code -> Nullable<Text>,
        qr_base64 -> Nullable<Text>,
        ticket_url -> Nullable<Text>,
        status -> Text,
        paid_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    order_items (id) {
        id -> Uuid,
        order_id -> Uuid,
        product_id -> Text,
        name -> Text,
        size -> Text,
        qty -> Int4,
        price_minor -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    donations (id) {
        id -> Uuid,
        donor_name -> Text,
        contact -> Text,
        amount_minor -> Int8,
        payment_id -> Nullable<Text>,
        qr_code -> Nullable<Text>,
        qr_base64 -> Nullable<Text>,
        ticket_url -> Nullable<Text>,
        status -> Text,
        paid_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    admins (id) {
        id -> Uuid,
        full_name -> Text,
        email -> Text,
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(cart_items -> users (user_id));
diesel::joinable!(orders -> users (user_id));
diesel::joinable!(order_items -> orders (order_id));

diesel::allow_tables_to_appear_in_same_query!(
    admins,
    cart_items,
    donations,
    inscricoes,
    order_items,
    orders,
    users,
);
