diesel::table! {
    users (id) {
        id -> Int4,
        username -> Varchar,
        email -> Varchar,
        is_active -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    chats (id) {
        id -> Int4,
        title -> Varchar,
        description -> Nullable<Varchar>,
        aggregate_sentiment -> Varchar,
        aggregate_urgency -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    messages (id) {
        id -> Int4,
        chat_id -> Int4,
        author_user_id -> Nullable<Int4>,
        content -> Text,
        status -> Varchar,
        sentiment -> Varchar,
        urgency_tier -> Varchar,
        urgency_score -> Int4,
        reaction_glyph -> Nullable<Varchar>,
        is_bot -> Bool,
        alert_triggered -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(messages -> chats (chat_id));
diesel::joinable!(messages -> users (author_user_id));

diesel::allow_tables_to_appear_in_same_query!(users, chats, messages);
