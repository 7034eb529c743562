//! Declared entity types and their field tables.
//!
//! # Design
//! Each remote entity type maps to a static, shared table of
//! [`FieldDescriptor`] rows. A row names the field as the remote API
//! exposes it and records which of the fetch strategies applies: read from
//! the entity's own document, follow an embedded id, or hit a dedicated
//! relation endpoint. Declaring a new remote field means adding a row here;
//! the accessor code paths in `entity` never change.

use std::fmt;

/// The declared remote entity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Action,
    Attachment,
    Board,
    Card,
    CheckItem,
    Checklist,
    Label,
    List,
    Member,
    Notification,
    Organization,
    Sticker,
}

impl EntityKind {
    /// URL path segment under which this type lives, e.g. `cards` in
    /// `/cards/<id>` and `/lists/<id>/cards`.
    pub const fn segment(self) -> &'static str {
        match self {
            EntityKind::Action => "actions",
            EntityKind::Attachment => "attachments",
            EntityKind::Board => "boards",
            EntityKind::Card => "cards",
            EntityKind::CheckItem => "checkItems",
            EntityKind::Checklist => "checklists",
            EntityKind::Label => "labels",
            EntityKind::List => "lists",
            EntityKind::Member => "members",
            EntityKind::Notification => "notifications",
            EntityKind::Organization => "organizations",
            EntityKind::Sticker => "stickers",
        }
    }

    /// Declared field table for this type.
    pub const fn fields(self) -> &'static [FieldDescriptor] {
        match self {
            EntityKind::Action => ACTION,
            EntityKind::Attachment => ATTACHMENT,
            EntityKind::Board => BOARD,
            EntityKind::Card => CARD,
            EntityKind::CheckItem => CHECK_ITEM,
            EntityKind::Checklist => CHECKLIST,
            EntityKind::Label => LABEL,
            EntityKind::List => LIST,
            EntityKind::Member => MEMBER,
            EntityKind::Notification => NOTIFICATION,
            EntityKind::Organization => ORGANIZATION,
            EntityKind::Sticker => STICKER,
        }
    }

    pub(crate) fn field(self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields().iter().find(|d| d.name == name)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Action => "action",
            EntityKind::Attachment => "attachment",
            EntityKind::Board => "board",
            EntityKind::Card => "card",
            EntityKind::CheckItem => "checkItem",
            EntityKind::Checklist => "checklist",
            EntityKind::Label => "label",
            EntityKind::List => "list",
            EntityKind::Member => "member",
            EntityKind::Notification => "notification",
            EntityKind::Organization => "organization",
            EntityKind::Sticker => "sticker",
        };
        f.write_str(name)
    }
}

/// One declared field of an entity type: its exposed name and how to
/// fetch it.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// Fetch strategy for a declared field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Plain value in the entity's own document, under the field name.
    Scalar,
    /// Single related entity whose id is embedded in the entity's own
    /// document under `key`.
    BelongsTo {
        key: &'static str,
        target: EntityKind,
    },
    /// Single related entity served by `/<segment>/<id>/<field>`.
    BelongsToVia { target: EntityKind },
    /// Related entities whose ids are embedded in the entity's own
    /// document under `key`.
    IdList {
        key: &'static str,
        target: EntityKind,
    },
    /// Related entities served by `/<segment>/<id>/<field>`.
    Sublist { target: EntityKind },
}

impl FieldDescriptor {
    pub const fn scalar(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Scalar,
        }
    }

    pub const fn belongs_to(name: &'static str, key: &'static str, target: EntityKind) -> Self {
        Self {
            name,
            kind: FieldKind::BelongsTo { key, target },
        }
    }

    pub const fn belongs_to_via(name: &'static str, target: EntityKind) -> Self {
        Self {
            name,
            kind: FieldKind::BelongsToVia { target },
        }
    }

    pub const fn id_list(name: &'static str, key: &'static str, target: EntityKind) -> Self {
        Self {
            name,
            kind: FieldKind::IdList { key, target },
        }
    }

    pub const fn sublist(name: &'static str, target: EntityKind) -> Self {
        Self {
            name,
            kind: FieldKind::Sublist { target },
        }
    }
}

// Scalar names mirror the remote JSON keys verbatim; relationship rows name
// the link and record the embedded key next to it.

const ACTION: &[FieldDescriptor] = &[
    FieldDescriptor::scalar("data"),
    FieldDescriptor::scalar("type"),
    FieldDescriptor::scalar("date"),
    FieldDescriptor::belongs_to("creator", "idMemberCreator", EntityKind::Member),
    FieldDescriptor::belongs_to_via("board", EntityKind::Board),
];

const ATTACHMENT: &[FieldDescriptor] = &[
    FieldDescriptor::scalar("bytes"),
    FieldDescriptor::scalar("date"),
    FieldDescriptor::scalar("mimeType"),
    FieldDescriptor::scalar("name"),
    FieldDescriptor::scalar("url"),
    FieldDescriptor::scalar("isUpload"),
];

const BOARD: &[FieldDescriptor] = &[
    FieldDescriptor::scalar("url"),
    FieldDescriptor::scalar("name"),
    FieldDescriptor::scalar("pinned"),
    FieldDescriptor::scalar("prefs"),
    FieldDescriptor::scalar("desc"),
    FieldDescriptor::scalar("closed"),
    FieldDescriptor::belongs_to("organization", "idOrganization", EntityKind::Organization),
    FieldDescriptor::sublist("actions", EntityKind::Action),
    FieldDescriptor::sublist("cards", EntityKind::Card),
    FieldDescriptor::sublist("checklists", EntityKind::Checklist),
    FieldDescriptor::sublist("lists", EntityKind::List),
    FieldDescriptor::sublist("members", EntityKind::Member),
    FieldDescriptor::sublist("labels", EntityKind::Label),
];

const CARD: &[FieldDescriptor] = &[
    FieldDescriptor::scalar("url"),
    FieldDescriptor::scalar("closed"),
    FieldDescriptor::scalar("name"),
    FieldDescriptor::scalar("badges"),
    FieldDescriptor::scalar("checkItemStates"),
    FieldDescriptor::scalar("desc"),
    FieldDescriptor::scalar("idLabels"),
    FieldDescriptor::scalar("due"),
    FieldDescriptor::belongs_to("board", "idBoard", EntityKind::Board),
    FieldDescriptor::belongs_to("list", "idList", EntityKind::List),
    FieldDescriptor::id_list("checklists", "idChecklists", EntityKind::Checklist),
    FieldDescriptor::id_list("members", "idMembers", EntityKind::Member),
    FieldDescriptor::sublist("stickers", EntityKind::Sticker),
    FieldDescriptor::sublist("attachments", EntityKind::Attachment),
    FieldDescriptor::sublist("labels", EntityKind::Label),
];

const CHECK_ITEM: &[FieldDescriptor] = &[
    FieldDescriptor::scalar("name"),
    FieldDescriptor::scalar("pos"),
    FieldDescriptor::scalar("type"),
];

const CHECKLIST: &[FieldDescriptor] = &[
    FieldDescriptor::scalar("name"),
    FieldDescriptor::belongs_to("board", "idBoard", EntityKind::Board),
    FieldDescriptor::sublist("checkItems", EntityKind::CheckItem),
    FieldDescriptor::sublist("cards", EntityKind::Card),
];

const LABEL: &[FieldDescriptor] = &[
    FieldDescriptor::scalar("name"),
    FieldDescriptor::scalar("color"),
    FieldDescriptor::scalar("uses"),
    FieldDescriptor::belongs_to("board", "idBoard", EntityKind::Board),
];

const LIST: &[FieldDescriptor] = &[
    FieldDescriptor::scalar("closed"),
    FieldDescriptor::scalar("name"),
    FieldDescriptor::scalar("url"),
    FieldDescriptor::belongs_to("board", "idBoard", EntityKind::Board),
    FieldDescriptor::sublist("cards", EntityKind::Card),
];

const MEMBER: &[FieldDescriptor] = &[
    FieldDescriptor::scalar("url"),
    FieldDescriptor::scalar("fullName"),
    FieldDescriptor::scalar("username"),
    FieldDescriptor::sublist("actions", EntityKind::Action),
    FieldDescriptor::sublist("boards", EntityKind::Board),
    FieldDescriptor::sublist("cards", EntityKind::Card),
    FieldDescriptor::sublist("notifications", EntityKind::Notification),
    FieldDescriptor::sublist("organizations", EntityKind::Organization),
];

const NOTIFICATION: &[FieldDescriptor] = &[
    FieldDescriptor::scalar("data"),
    FieldDescriptor::scalar("date"),
    FieldDescriptor::scalar("type"),
    FieldDescriptor::scalar("unread"),
    FieldDescriptor::belongs_to("creator", "idMemberCreator", EntityKind::Member),
];

const ORGANIZATION: &[FieldDescriptor] = &[
    FieldDescriptor::scalar("url"),
    FieldDescriptor::scalar("desc"),
    FieldDescriptor::scalar("displayName"),
    FieldDescriptor::scalar("name"),
    FieldDescriptor::sublist("actions", EntityKind::Action),
    FieldDescriptor::sublist("boards", EntityKind::Board),
    FieldDescriptor::sublist("members", EntityKind::Member),
];

const STICKER: &[FieldDescriptor] = &[FieldDescriptor::scalar("image")];
