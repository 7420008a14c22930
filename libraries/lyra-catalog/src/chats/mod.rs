use lyra_core::fields;
use lyra_core::types::{
    Chat, ChatId, ChatSummary, Collection, DocRef, Document, FieldUpdate, Filter, MessageId, Query,
    UserId, Value,
};
use lyra_core::{DocumentStore, LyraError, Result};

use crate::resolver::{decode_plain, Resolver};
use crate::shapes;

/// Participant pair in canonical order (sorted by document path)
pub fn participant_pair(me: &UserId, other: &UserId) -> Vec<DocRef> {
    let mut pair = vec![me.doc_ref(), other.doc_ref()];
    pair.sort_by_key(DocRef::path);
    pair
}

/// Standing query for every chat `user` takes part in
pub fn user_chats_query(user: &UserId) -> Query {
    Query::all().filter(Filter::array_contains("participants", user.doc_ref()))
}

/// Start an empty chat between `me` and `other`
pub async fn create_with_user(
    store: &dyn DocumentStore,
    me: &UserId,
    other: &UserId,
) -> Result<ChatId> {
    if me == other {
        return Err(LyraError::invalid_input("cannot start a chat with yourself"));
    }
    let id = store
        .create_document(
            Collection::Chats,
            fields! {
                "participants" => participant_pair(me, other),
                "messages" => Value::Array(Vec::new()),
                "lastMessage" => Value::Null,
                "timestamp" => Value::ServerTimestamp,
            },
        )
        .await?;

    tracing::info!(chat = %id, me = %me, other = %other, "Chat created");
    Ok(ChatId::new(id))
}

/// The chat between `me` and `other`, references left as ids
pub async fn get_by_user(
    store: &dyn DocumentStore,
    me: &UserId,
    other: &UserId,
) -> Result<Option<ChatSummary>> {
    let query = Query::all().filter(Filter::eq("participants", participant_pair(me, other)));
    let docs = store.fetch_many(Collection::Chats, &query).await?;
    docs.first().map(decode_plain::<ChatSummary>).transpose()
}

/// Store a text message and append it to the chat
pub async fn send_message(
    store: &dyn DocumentStore,
    sender: &UserId,
    chat: &ChatId,
    text: &str,
) -> Result<MessageId> {
    if text.trim().is_empty() {
        return Err(LyraError::invalid_input("message text is empty"));
    }

    let message_id = store
        .create_document(
            Collection::Messages,
            fields! {
                "sender" => sender.doc_ref(),
                "chat" => chat.doc_ref(),
                "content" => Value::Map(fields! { "type" => "text", "value" => text }),
                "timestamp" => Value::ServerTimestamp,
            },
        )
        .await?;
    let message = MessageId::new(message_id);

    store
        .update_document(
            &chat.doc_ref(),
            vec![
                (
                    "messages".to_string(),
                    FieldUpdate::array_union(message.doc_ref()),
                ),
                ("lastMessage".to_string(), FieldUpdate::set(message.doc_ref())),
            ],
        )
        .await?;

    tracing::debug!(chat = %chat, message = %message, "Message sent");
    Ok(message)
}

/// Resolve chat documents into full chats
pub async fn resolve(store: &dyn DocumentStore, docs: &[Document]) -> Result<Vec<Chat>> {
    Resolver::new(store)
        .resolve_all_as(docs, &shapes::chat())
        .await
}

/// One-shot read of every chat `user` takes part in
pub async fn fetch_for_user(store: &dyn DocumentStore, user: &UserId) -> Result<Vec<Chat>> {
    let docs = store
        .fetch_many(Collection::Chats, &user_chats_query(user))
        .await?;
    resolve(store, &docs).await
}
