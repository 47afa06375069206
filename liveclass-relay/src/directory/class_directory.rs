use async_trait::async_trait;
use dashmap::DashMap;
use liveclass_core::{ClassId, ParticipantId};

/// Which live classes exist and who is enrolled in them.
#[async_trait]
pub trait ClassDirectory: Send + Sync {
    async fn class_exists(&self, class_id: &ClassId) -> bool;

    async fn roster(&self, class_id: &ClassId) -> Option<Vec<ParticipantId>>;

    async fn is_enrolled(&self, class_id: &ClassId, participant: &ParticipantId) -> bool {
        self.roster(class_id)
            .await
            .is_some_and(|roster| roster.contains(participant))
    }
}

#[derive(Default)]
pub struct StaticClassDirectory {
    classes: DashMap<ClassId, Vec<ParticipantId>>,
}

impl StaticClassDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a class, replacing any previous roster.
    pub fn insert_class(&self, class_id: ClassId, participants: Vec<ParticipantId>) {
        self.classes.insert(class_id, participants);
    }

    pub fn enroll(&self, class_id: ClassId, participant: ParticipantId) {
        let mut roster = self.classes.entry(class_id).or_default();
        if !roster.contains(&participant) {
            roster.push(participant);
        }
    }
}

#[async_trait]
impl ClassDirectory for StaticClassDirectory {
    async fn class_exists(&self, class_id: &ClassId) -> bool {
        self.classes.contains_key(class_id)
    }

    async fn roster(&self, class_id: &ClassId) -> Option<Vec<ParticipantId>> {
        self.classes.get(class_id).map(|entry| entry.value().clone())
    }

    async fn is_enrolled(&self, class_id: &ClassId, participant: &ParticipantId) -> bool {
        self.classes
            .get(class_id)
            .is_some_and(|entry| entry.value().contains(participant))
    }
}
