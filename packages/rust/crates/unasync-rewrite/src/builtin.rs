//! Rename tables for the Tideline SDK.
//!
//! Every public async type and factory in `tideline` has exactly one entry
//! here; the emitter refuses to publish a mirror when a new one is missing.

/// Async entry-point type; its rename target heads the mirror manifest.
pub const ENTRY_POINT: &str = "AsyncTideline";

/// Public async classes and their blocking counterparts.
pub const TYPE_RENAMES: &[(&str, &str)] = &[
    ("AsyncTideline", "Tideline"),
    ("AsyncPaginator", "Paginator"),
    ("AsyncBaseService", "BaseService"),
    ("AsyncCompaniesService", "CompaniesService"),
    ("AsyncContactsService", "ContactsService"),
    ("AsyncDealsService", "DealsService"),
    ("AsyncNotesService", "NotesService"),
    ("AsyncTasksService", "TasksService"),
    ("AsyncUsersService", "UsersService"),
    ("AsyncPipelinesService", "PipelinesService"),
    ("AsyncStagesService", "StagesService"),
    ("AsyncActivitiesService", "ActivitiesService"),
    ("AsyncFilesService", "FilesService"),
    ("AsyncWebhooksService", "WebhooksService"),
    ("AsyncTagsService", "TagsService"),
    ("AsyncCustomFieldsService", "CustomFieldsService"),
    ("AsyncListsService", "ListsService"),
    ("AsyncOptionsService", "OptionsService"),
];

/// Registry functions, in manifest order.
pub const FACTORY_RENAMES: &[(&str, &str)] = &[
    ("configure_async", "configure"),
    ("get_async_client", "get_client"),
    ("clear_async_client", "clear_client"),
    ("async_session", "session"),
    ("async_companies", "companies"),
    ("async_contacts", "contacts"),
    ("async_deals", "deals"),
    ("async_notes", "notes"),
    ("async_tasks", "tasks"),
    ("async_users", "users"),
    ("async_pipelines", "pipelines"),
    ("async_stages", "stages"),
    ("async_activities", "activities"),
    ("async_files", "files"),
    ("async_webhooks", "webhooks"),
    ("async_tags", "tags"),
    ("async_custom_fields", "custom_fields"),
    ("async_lists", "lists"),
    ("async_options", "options"),
];

/// Mirrored modules. Submodules follow their longest listed prefix.
pub const MODULE_RENAMES: &[(&str, &str)] = &[
    ("tideline.client", "tideline._sync.client"),
    ("tideline.registry", "tideline._sync.registry"),
    ("tideline._pagination", "tideline._sync._pagination"),
    ("tideline.resources", "tideline._sync.resources"),
];
