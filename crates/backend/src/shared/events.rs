//! Канал изменений файлов договоров (для SSE-подписки клиентов)

use contracts::domain::a002_contract_file::aggregate::ContractFileEvent;
use once_cell::sync::Lazy;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

const CHANNEL_CAPACITY: usize = 256;

static HUB: Lazy<EventHub> = Lazy::new(EventHub::new);

pub struct EventHub {
    sender: broadcast::Sender<ContractFileEvent>,
}

impl EventHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Отправить событие всем подписчикам. Возвращает число получателей.
    pub fn publish(&self, event: ContractFileEvent) -> usize {
        // Ошибка означает лишь отсутствие подписчиков
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ContractFileEvent> {
        self.sender.subscribe()
    }

    /// Поток событий для одного подписчика.
    /// Отставший подписчик пропускает потерянные события.
    pub fn stream(&self) -> impl Stream<Item = ContractFileEvent> {
        BroadcastStream::new(self.subscribe()).filter_map(|item| match item {
            Ok(event) => Some(event),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!("SSE subscriber lagged, skipped {} events", skipped);
                None
            }
        })
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

pub fn hub() -> &'static EventHub {
    &HUB
}

pub fn publish(event: ContractFileEvent) {
    let receivers = hub().publish(event);
    tracing::debug!("contract_file event delivered to {} subscribers", receivers);
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a002_contract_file::aggregate::DownloadStatus;

    fn removed(id: &str) -> ContractFileEvent {
        ContractFileEvent::Removed {
            file_id: id.into(),
            contract_id: "c-1".into(),
        }
    }

    #[tokio::test]
    async fn test_subscribers_receive_published_events() {
        let hub = EventHub::new();
        let mut first = Box::pin(hub.stream());
        let mut second = Box::pin(hub.stream());
        assert_eq!(hub.subscriber_count(), 2);

        hub.publish(ContractFileEvent::StatusChanged {
            file_id: "f-1".into(),
            contract_id: "c-1".into(),
            status: DownloadStatus::Completed,
            downloaded_at: None,
            size: Some(10),
        });

        for stream in [&mut first, &mut second] {
            match stream.next().await {
                Some(ContractFileEvent::StatusChanged { file_id, status, .. }) => {
                    assert_eq!(file_id, "f-1");
                    assert_eq!(status, DownloadStatus::Completed);
                }
                other => panic!("unexpected: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_noop() {
        let hub = EventHub::new();
        assert_eq!(hub.publish(removed("f-1")), 0);
    }

    #[tokio::test]
    async fn test_lagging_subscriber_skips_missed_events() {
        let hub = EventHub::new();
        let mut stream = Box::pin(hub.stream());
        for i in 0..(CHANNEL_CAPACITY + 10) {
            hub.publish(removed(&format!("f-{}", i)));
        }
        // Самые старые события вытеснены, поток продолжает с доступных
        match stream.next().await {
            Some(ContractFileEvent::Removed { file_id, .. }) => assert_eq!(file_id, "f-10"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
