//! Resolution shapes for each entity

use crate::resolver::Shape;

/// Track: author and album, one level
pub fn track() -> Shape {
    Shape::leaf()
        .single("author", Shape::leaf())
        .single("album", Shape::leaf())
}

/// Album: author and its tracks in album order
pub fn album() -> Shape {
    Shape::leaf()
        .single("author", Shape::leaf())
        .many("tracks", Shape::leaf())
}

/// Message with its sender
pub fn message() -> Shape {
    Shape::leaf().single("sender", Shape::leaf())
}

/// Chat: participants, every message with its sender, last message with its sender
pub fn chat() -> Shape {
    Shape::leaf()
        .many("participants", Shape::leaf())
        .many("messages", message())
        .single("lastMessage", message())
}

/// Comment: author, album and (for replies) the parent comment
pub fn comment() -> Shape {
    Shape::leaf()
        .single("user", Shape::leaf())
        .single("album", Shape::leaf())
        .single("parent", Shape::leaf())
}

/// Report: all four references
pub fn report() -> Shape {
    Shape::leaf()
        .single("target", Shape::leaf())
        .single("targetUser", Shape::leaf())
        .single("reporterUser", Shape::leaf())
        .single("resolvedBy", Shape::leaf())
}
