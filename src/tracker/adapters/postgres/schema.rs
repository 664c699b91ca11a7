//! Diesel schema for tracker persistence.

diesel::table! {
    /// Registered users.
    users (id) {
        /// User identifier.
        id -> Uuid,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Lowercased login email, unique.
        #[max_length = 320]
        email -> Varchar,
        /// Role name.
        #[max_length = 50]
        role -> Varchar,
        /// Optional avatar URL.
        avatar_url -> Nullable<Text>,
        /// Registration timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Projects with their member set and issue counter.
    projects (id) {
        /// Project identifier.
        id -> Uuid,
        /// Issue-key prefix, unique.
        #[max_length = 10]
        key -> Varchar,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Optional description.
        description -> Nullable<Text>,
        /// Category name.
        #[max_length = 50]
        category -> Varchar,
        /// Owning user.
        owner_id -> Uuid,
        /// Member identifiers as a JSON array.
        members -> Jsonb,
        /// Number of issues ever created.
        issue_counter -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Sprints scoped to a project.
    sprints (id) {
        /// Sprint identifier.
        id -> Uuid,
        /// Owning project.
        project_id -> Uuid,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Optional goal.
        goal -> Nullable<Text>,
        /// Start date, set on activation.
        start_date -> Nullable<Timestamptz>,
        /// End date, set on completion.
        end_date -> Nullable<Timestamptz>,
        /// Lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Creating user.
        created_by -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Issues with their embedded activity log.
    issues (id) {
        /// Issue identifier.
        id -> Uuid,
        /// Owning project.
        project_id -> Uuid,
        /// Sequential number within the project.
        issue_number -> Int8,
        /// Rendered `KEY-N` key, unique.
        #[max_length = 32]
        issue_key -> Varchar,
        /// Title.
        #[max_length = 500]
        title -> Varchar,
        /// Optional description.
        description -> Nullable<Text>,
        /// Issue type.
        #[max_length = 50]
        issue_type -> Varchar,
        /// Board column.
        #[max_length = 50]
        status -> Varchar,
        /// Priority.
        #[max_length = 50]
        priority -> Varchar,
        /// Optional assignee.
        assignee_id -> Nullable<Uuid>,
        /// Reporting user.
        reporter_id -> Uuid,
        /// Sprint membership, null for the backlog.
        sprint_id -> Nullable<Uuid>,
        /// Optional estimate.
        story_points -> Nullable<Int4>,
        /// Labels as a JSON array.
        labels -> Jsonb,
        /// Activity log as a JSON array in append order.
        activities -> Jsonb,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Comments attached to issues.
    comments (id) {
        /// Comment identifier.
        id -> Uuid,
        /// Parent issue.
        issue_id -> Uuid,
        /// Authoring user.
        author_id -> Uuid,
        /// Body text.
        body -> Text,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last edit timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(comments -> issues (issue_id));
diesel::joinable!(issues -> projects (project_id));
diesel::joinable!(sprints -> projects (project_id));

diesel::allow_tables_to_appear_in_same_query!(users, projects, sprints, issues, comments);
