use crate::AppState;
use crate::error::AppError;
use crate::push::PushPayload;
use crate::routes::notification::model::Notification;

/// 触发通知的领域事件，封闭枚举，不接受开放式字段
#[derive(Debug, Clone)]
pub enum NotificationKind {
    Follow,
    Like { post_id: i64 },
    Reply { post_id: i64, reply_id: i64 },
    Mention { post_id: i64, reply_id: Option<i64> },
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Follow => "follow",
            NotificationKind::Like { .. } => "like",
            NotificationKind::Reply { .. } => "reply",
            NotificationKind::Mention { .. } => "mention",
        }
    }

    pub fn message(&self, actor: &str) -> String {
        match self {
            NotificationKind::Follow => format!("{} 关注了你", actor),
            NotificationKind::Like { .. } => format!("{} 赞了你的帖子", actor),
            NotificationKind::Reply { .. } => format!("{} 回复了你的帖子", actor),
            NotificationKind::Mention { .. } => format!("{} 在帖子中提到了你", actor),
        }
    }

    /// 推送的跳转链接
    pub fn url(&self) -> Option<String> {
        match self {
            NotificationKind::Follow => None,
            NotificationKind::Like { post_id }
            | NotificationKind::Reply { post_id, .. }
            | NotificationKind::Mention { post_id, .. } => Some(format!("/post/{}", post_id)),
        }
    }

    pub fn post_id(&self) -> Option<i64> {
        match self {
            NotificationKind::Follow => None,
            NotificationKind::Like { post_id }
            | NotificationKind::Reply { post_id, .. }
            | NotificationKind::Mention { post_id, .. } => Some(*post_id),
        }
    }

    pub fn reply_id(&self) -> Option<i64> {
        match self {
            NotificationKind::Reply { reply_id, .. } => Some(*reply_id),
            NotificationKind::Mention { reply_id, .. } => *reply_id,
            _ => None,
        }
    }
}

/// 通知调度：落库、实时广播、推送端点投递
///
/// 广播和推送都是尽力而为，失败只记录日志；通知记录本身写入失败才报错
pub async fn notify(
    state: &AppState,
    recipient_id: &str,
    actor_id: &str,
    actor_name: &str,
    kind: NotificationKind,
) -> Result<(), AppError> {
    // 自己触发的动作不通知自己
    if recipient_id == actor_id {
        return Ok(());
    }

    let record = Notification::create(&state.pool, recipient_id, actor_name, &kind).await?;

    if let Err(e) = state
        .bus
        .publish_to_user(recipient_id, "new_notification", &record)
        .await
    {
        tracing::warn!(error = %e, recipient_id, "通知实时广播失败");
    }

    let payload = PushPayload {
        title: "Folks".to_string(),
        body: record.message.clone(),
        url: kind.url(),
    };
    if let Err(e) = state.push.dispatch(&state.pool, recipient_id, &payload).await {
        tracing::warn!(error = ?e, recipient_id, "通知推送投递失败");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tags() {
        assert_eq!(NotificationKind::Follow.as_str(), "follow");
        assert_eq!(NotificationKind::Like { post_id: 1 }.as_str(), "like");
        assert_eq!(
            NotificationKind::Reply {
                post_id: 1,
                reply_id: 2
            }
            .as_str(),
            "reply"
        );
        assert_eq!(
            NotificationKind::Mention {
                post_id: 1,
                reply_id: None
            }
            .as_str(),
            "mention"
        );
    }

    #[test]
    fn message_carries_actor() {
        let msg = NotificationKind::Follow.message("小明");
        assert!(msg.contains("小明"));
    }

    #[test]
    fn url_points_to_post() {
        assert_eq!(NotificationKind::Follow.url(), None);
        assert_eq!(
            NotificationKind::Like { post_id: 9 }.url(),
            Some("/post/9".to_string())
        );
    }

    #[test]
    fn ids_extracted_per_kind() {
        let kind = NotificationKind::Reply {
            post_id: 3,
            reply_id: 7,
        };
        assert_eq!(kind.post_id(), Some(3));
        assert_eq!(kind.reply_id(), Some(7));
        assert_eq!(NotificationKind::Follow.post_id(), None);
    }
}
