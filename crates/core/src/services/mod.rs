//! Business logic services.

#![allow(missing_docs)]

pub mod album;
pub mod codec;
pub mod comment;
pub mod gallery;
pub mod media;
pub mod metadata;
pub mod share;
pub mod tag;
pub mod user;

#[cfg(test)]
pub(crate) mod testing;

pub use album::{AlbumService, FavoriteAction};
pub use codec::{FfmpegCodec, MediaCodec};
pub use comment::CommentService;
pub use gallery::{AlbumSummary, GalleryFilter, GalleryService, MediaEntry};
pub use media::{FilePayload, MediaService, SavedFile, UploadInput, UploadOutcome};
pub use metadata::{AlbumDocument, MetadataDocs, MetadataStore};
pub use share::ShareService;
pub use tag::{RenameOutcome, TagOutcome, TagService};
pub use user::{CreateUserInput, UserService};
