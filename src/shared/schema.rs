diesel::table! {
    users (id) {
        id -> Int4,
        username -> Text,
        password -> Text,
        full_name -> Text,
        email -> Text,
        role -> Text,
        avatar_url -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    business_units (id) {
        id -> Int4,
        name -> Text,
        color -> Text,
    }
}

diesel::table! {
    tags (id) {
        id -> Int4,
        name -> Text,
    }
}

diesel::table! {
    custom_fields (id) {
        id -> Int4,
        name -> Text,
        #[sql_name = "type"]
        field_type -> Text,
        required -> Bool,
        options -> Nullable<Jsonb>,
    }
}

diesel::table! {
    deals (id) {
        id -> Int4,
        company -> Text,
        website -> Nullable<Text>,
        internal_contact -> Nullable<Text>,
        business_unit_id -> Nullable<Int4>,
        deal_type -> Text,
        investment_size -> Nullable<Int4>,
        use_case -> Nullable<Text>,
        lead_owner_id -> Nullable<Int4>,
        stage -> Text,
        notes -> Nullable<Text>,
        ai_summary -> Nullable<Text>,
        ai_market_report_link -> Nullable<Text>,
        last_updated -> Timestamptz,
        created_at -> Timestamptz,
        custom_field_values -> Nullable<Jsonb>,
    }
}

diesel::table! {
    deal_tags (id) {
        id -> Int4,
        deal_id -> Int4,
        tag_id -> Int4,
    }
}

diesel::table! {
    resources (id) {
        id -> Int4,
        deal_id -> Int4,
        name -> Text,
        url -> Text,
        #[sql_name = "type"]
        resource_type -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    comments (id) {
        id -> Int4,
        deal_id -> Int4,
        user_id -> Int4,
        content -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    activity_logs (id) {
        id -> Int4,
        deal_id -> Int4,
        user_id -> Int4,
        action -> Text,
        details -> Nullable<Jsonb>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(deals -> business_units (business_unit_id));
diesel::joinable!(deals -> users (lead_owner_id));
diesel::joinable!(deal_tags -> deals (deal_id));
diesel::joinable!(deal_tags -> tags (tag_id));
diesel::joinable!(resources -> deals (deal_id));
diesel::joinable!(comments -> deals (deal_id));
diesel::joinable!(comments -> users (user_id));
diesel::joinable!(activity_logs -> deals (deal_id));
diesel::joinable!(activity_logs -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    business_units,
    tags,
    custom_fields,
    deals,
    deal_tags,
    resources,
    comments,
    activity_logs,
);
