// Mirrors the juicebox database; the camelCase columns are quoted in SQL.

diesel::table! {
    users (id) {
        id -> Int4,
        #[max_length = 255]
        username -> Varchar,
        #[max_length = 255]
        password -> Varchar,
        #[max_length = 255]
        name -> Varchar,
        #[max_length = 255]
        location -> Varchar,
        active -> Bool,
    }
}

diesel::table! {
    posts (id) {
        id -> Int4,
        #[sql_name = "authorId"]
        author_id -> Int4,
        #[max_length = 255]
        title -> Varchar,
        content -> Text,
        active -> Bool,
    }
}

diesel::table! {
    tags (id) {
        id -> Int4,
        #[max_length = 255]
        name -> Varchar,
    }
}

diesel::table! {
    post_tags (post_id, tag_id) {
        #[sql_name = "postId"]
        post_id -> Int4,
        #[sql_name = "tagId"]
        tag_id -> Int4,
    }
}

diesel::joinable!(posts -> users (author_id));
diesel::joinable!(post_tags -> posts (post_id));
diesel::joinable!(post_tags -> tags (tag_id));

diesel::allow_tables_to_appear_in_same_query!(post_tags, posts, tags, users,);
