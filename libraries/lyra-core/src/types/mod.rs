mod ids;
mod link;
mod query;
mod value;

// Entities decoded from resolved aggregates
mod album;
mod artist;
mod chat;
mod comment;
mod report;
mod track;
mod user;

pub use ids::{
    AlbumId, ChatId, Collection, CommentId, DocRef, MessageId, ReportId, TrackId, UserId,
};
pub use link::{Identified, Link};
pub use query::{Direction, FieldUpdate, Filter, Query, Updates, WriteBatch};
pub use value::{fields_to_json, Document, Fields, Value, REF_KEY, TIMESTAMP_KEY};

pub use album::{Album, AlbumSummary, CreateAlbum};
pub use artist::Artist;
pub use chat::{Chat, ChatSummary, Message, MessageContent};
pub use comment::Comment;
pub use report::{CreateReport, Report, ReportAction, ReportResolution, ReportStatus, ReportType};
pub use track::{CreateTrack, Track};
pub use user::{ProfileUpdate, Role, User};
