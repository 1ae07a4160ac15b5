use attachment_core::db::open_db_in_memory;
use attachment_core::registry::provider::keys;
use attachment_core::{
    AppConfig, Attachment, AttachmentContainer, AttachmentDescriptor, AttachmentQuery,
    AttachmentRepository, AttachmentsConfig, ServiceProvider, ServiceRegistry,
    SqliteAttachmentRepository, CONTAINER_OBJ_TYPE,
};
use rusqlite::Connection;
use serde_json::json;

fn image_only_config() -> AttachmentsConfig {
    AttachmentsConfig::default().with_object("image", AttachmentDescriptor::labeled("Image"))
}

/// Stores a gallery plus one child per object type, attached in order.
fn seed_gallery(conn: &Connection, child_types: &[&str]) -> (Attachment, Vec<Attachment>) {
    let repo = SqliteAttachmentRepository::new(conn);
    let gallery = Attachment::new(CONTAINER_OBJ_TYPE).titled("Gallery");
    repo.create_attachment(&gallery).unwrap();

    let children = child_types
        .iter()
        .map(|obj_type| {
            let child = Attachment::new(*obj_type);
            repo.create_attachment(&child).unwrap();
            repo.attach(&gallery.as_source(), child.uuid, "generic", None)
                .unwrap();
            child
        })
        .collect();
    (gallery, children)
}

#[test]
fn known_types_get_descriptor_and_unknown_types_get_empty() {
    let conn = open_db_in_memory().unwrap();
    let (gallery, _) = seed_gallery(&conn, &["image", "video"]);
    let container = AttachmentContainer::new(
        gallery,
        SqliteAttachmentRepository::new(&conn),
        image_only_config(),
    );

    let attachments = container.attachments(&AttachmentQuery::default()).unwrap();

    assert_eq!(attachments.len(), 2);
    assert_eq!(
        attachments[0].attachment_type,
        Some(AttachmentDescriptor::labeled("Image"))
    );
    let empty = attachments[1].attachment_type.as_ref().unwrap();
    assert!(empty.is_empty());
    assert_eq!(serde_json::to_value(empty).unwrap(), json!({}));
}

#[test]
fn every_fetched_attachment_is_annotated_in_base_order() {
    let conn = open_db_in_memory().unwrap();
    let (gallery, children) = seed_gallery(&conn, &["file", "image", "embed", "image"]);
    let container = AttachmentContainer::new(
        gallery,
        SqliteAttachmentRepository::new(&conn),
        image_only_config(),
    );

    let attachments = container.attachments(&AttachmentQuery::default()).unwrap();

    let fetched = attachments.iter().map(|a| a.uuid).collect::<Vec<_>>();
    let expected = children.iter().map(|a| a.uuid).collect::<Vec<_>>();
    assert_eq!(fetched, expected);
    for attachment in &attachments {
        let descriptor = attachment.attachment_type.as_ref().unwrap();
        assert_eq!(descriptor.is_empty(), attachment.obj_type != "image");
    }
}

#[test]
fn annotation_follows_config_changes_between_fetches() {
    let conn = open_db_in_memory().unwrap();
    let (gallery, _) = seed_gallery(&conn, &["video"]);
    let mut container = AttachmentContainer::new(
        gallery,
        SqliteAttachmentRepository::new(&conn),
        image_only_config(),
    );

    let before = container.attachments(&AttachmentQuery::default()).unwrap();
    assert!(before[0].attachment_type.as_ref().unwrap().is_empty());

    container.set_config(
        image_only_config().with_object("video", AttachmentDescriptor::labeled("Video")),
    );
    let after = container.attachments(&AttachmentQuery::default()).unwrap();
    assert_eq!(
        after[0].attachment_type,
        Some(AttachmentDescriptor::labeled("Video"))
    );
}

#[test]
fn inactive_descriptors_are_not_attachable() {
    let conn = open_db_in_memory().unwrap();
    let (gallery, _) = seed_gallery(&conn, &["video"]);
    let disabled = AttachmentDescriptor {
        active: Some(false),
        ..AttachmentDescriptor::labeled("Video")
    };
    let container = AttachmentContainer::new(
        gallery,
        SqliteAttachmentRepository::new(&conn),
        image_only_config().with_object("video", disabled),
    );

    assert_eq!(
        container.attachable_objects().keys().collect::<Vec<_>>(),
        ["image"]
    );
    let attachments = container.attachments(&AttachmentQuery::default()).unwrap();
    assert!(attachments[0].attachment_type.as_ref().unwrap().is_empty());
}

#[test]
fn filters_are_forwarded_to_the_base_fetch() {
    let conn = open_db_in_memory().unwrap();
    let (gallery, _) = seed_gallery(&conn, &["image", "video", "image"]);
    let container = AttachmentContainer::new(
        gallery,
        SqliteAttachmentRepository::new(&conn),
        image_only_config(),
    );

    let images = container
        .attachments(&AttachmentQuery::of_type("image"))
        .unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(
        container
            .num_attachments(&AttachmentQuery::of_type("video"))
            .unwrap(),
        1
    );
    assert!(!container
        .has_attachments(&AttachmentQuery::in_group("sidebar"))
        .unwrap());
}

#[test]
fn add_and_remove_attachments() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAttachmentRepository::new(&conn);
    let (gallery, _) = seed_gallery(&conn, &[]);
    let image = Attachment::new("image");
    let video = Attachment::new("video");
    repo.create_attachment(&image).unwrap();
    repo.create_attachment(&video).unwrap();

    let container = AttachmentContainer::new(gallery, repo, image_only_config());
    assert!(container.is_attachment_container());

    assert_eq!(container.add_attachment(video.uuid, None, Some(2)).unwrap(), 2);
    assert_eq!(container.add_attachment(image.uuid, None, Some(1)).unwrap(), 1);
    assert_eq!(
        container
            .add_attachment(image.uuid, Some("sidebar"), None)
            .unwrap(),
        0
    );

    let generic = container
        .attachments(&AttachmentQuery::in_group("generic"))
        .unwrap();
    assert_eq!(
        generic.iter().map(|a| a.uuid).collect::<Vec<_>>(),
        [image.uuid, video.uuid]
    );

    assert_eq!(container.remove_attachment(image.uuid, Some("generic")).unwrap(), 1);
    assert_eq!(container.num_attachments(&AttachmentQuery::default()).unwrap(), 2);
    assert_eq!(container.remove_attachments(Some("sidebar")).unwrap(), 1);
    assert_eq!(container.remove_attachments(None).unwrap(), 1);
    assert!(!container.has_attachments(&AttachmentQuery::default()).unwrap());
}

#[test]
fn registry_override_wins_over_app_config_section() {
    let conn = open_db_in_memory().unwrap();
    let (gallery, _) = seed_gallery(&conn, &["video"]);

    let mut registry = ServiceRegistry::new();
    registry.set(
        keys::CONFIG,
        AppConfig::from_value(json!({
            "attachments": {
                "attachable_objects": { "video": { "label": "Video" } }
            }
        }))
        .unwrap(),
    );
    let from_config = AttachmentContainer::from_registry(
        gallery.clone(),
        SqliteAttachmentRepository::new(&conn),
        &registry,
    )
    .unwrap();
    let attachments = from_config.attachments(&AttachmentQuery::default()).unwrap();
    assert_eq!(
        attachments[0].attachment_type,
        Some(AttachmentDescriptor::labeled("Video"))
    );

    ServiceProvider::default().register_attachments_config(&mut registry, image_only_config());
    let overridden = AttachmentContainer::from_registry(
        gallery,
        SqliteAttachmentRepository::new(&conn),
        &registry,
    )
    .unwrap();
    let attachments = overridden.attachments(&AttachmentQuery::default()).unwrap();
    assert!(attachments[0].attachment_type.as_ref().unwrap().is_empty());
}

#[test]
fn empty_registry_yields_empty_configuration() {
    let conn = open_db_in_memory().unwrap();
    let (gallery, _) = seed_gallery(&conn, &["image"]);

    let mut registry = ServiceRegistry::new();
    ServiceProvider::default().register_config(&mut registry);
    let container = AttachmentContainer::from_registry(
        gallery,
        SqliteAttachmentRepository::new(&conn),
        &registry,
    )
    .unwrap();

    assert!(container.attachable_objects().is_empty());
    assert_eq!(container.config().default_group(), "generic");
    let attachments = container.attachments(&AttachmentQuery::default()).unwrap();
    assert_eq!(attachments[0].attachment_type, Some(AttachmentDescriptor::empty()));
}

#[test]
fn override_skips_config_lookup_entirely() {
    let conn = open_db_in_memory().unwrap();
    let (gallery, _) = seed_gallery(&conn, &["image"]);

    let mut registry = ServiceRegistry::new();
    registry.set(keys::CONFIG, json!({ "base_path": "." }));
    ServiceProvider::default().register_attachments_config(&mut registry, image_only_config());

    let container = AttachmentContainer::from_registry(
        gallery.clone(),
        SqliteAttachmentRepository::new(&conn),
        &registry,
    )
    .unwrap();
    let attachments = container.attachments(&AttachmentQuery::default()).unwrap();
    assert_eq!(
        attachments[0].attachment_type,
        Some(AttachmentDescriptor::labeled("Image"))
    );

    registry.register(keys::CONFIG, |_| -> Result<AppConfig, Box<dyn std::error::Error>> {
        Err("config unavailable".into())
    });
    assert!(AttachmentContainer::from_registry(
        gallery,
        SqliteAttachmentRepository::new(&conn),
        &registry,
    )
    .is_ok());
    assert!(!registry.is_resolved(keys::CONFIG));
}
