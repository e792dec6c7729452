//! Application state and the handlers behind every user action.
//!
//! `App` owns one [`AppState`], rebuilt wholesale on every load. Handlers
//! validate before touching the network, report the outcome as a
//! notification and patch local state on success.

use thiserror::Error;
use tracing::{error, info};

use crate::api::{ApiError, ApiResult, FamilyApi};
use crate::config::Config;
use crate::graph::FamilyGraph;
use crate::layout::{FamilyLayout, TimelineLayout, compute_family_layout, layout_timeline};
use crate::model::{Event, FamilySnapshot, Person, RelationType, Relationship, Statistics};
use crate::notify::Notifications;
use crate::render::{render_family_svg, render_timeline_svg};
use crate::validate::{FieldError, validate_event, validate_person, validate_relationship};

pub const LOAD_FAILED: &str = "Gagal memuat data keluarga. Silakan coba lagi.";
pub const NO_RELATIONSHIPS: &str = "Tidak ada hubungan yang ditemukan untuk anggota ini.";

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub statistics: Statistics,
    pub family: FamilySnapshot,
    pub graph: FamilyGraph,
}

impl AppState {
    pub fn from_snapshot(family: FamilySnapshot) -> Self {
        let mut state = Self {
            family,
            ..Self::default()
        };
        state.rebuild_graph();
        state
    }

    fn rebuild_graph(&mut self) {
        self.graph = FamilyGraph::build(&self.family.people, &self.family.relationships);
    }

    pub fn person(&self, id: &str) -> Option<&Person> {
        self.family.people.iter().find(|p| p.id == id)
    }

    pub fn event(&self, id: &str) -> Option<&Event> {
        self.family.events.iter().find(|e| e.id == id)
    }
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("{} field(s) invalid", .0.len())]
    Invalid(Vec<FieldError>),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// A relationship seen from one member's side.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberRelation<'a> {
    pub relationship_id: &'a str,
    pub other: &'a Person,
    pub label: String,
}

/// What the other person is to `member_is_first`'s side of the relationship.
pub fn relation_label(kind: &RelationType, member_is_first: bool) -> String {
    match kind {
        RelationType::Spouse => "Pasangan".to_string(),
        RelationType::Sibling => "Saudara".to_string(),
        RelationType::ParentOf if member_is_first => "Anak".to_string(),
        RelationType::ParentOf => "Orang tua".to_string(),
        RelationType::Child if member_is_first => "Orang tua".to_string(),
        RelationType::Child => "Anak".to_string(),
        RelationType::Other(name) => name.clone(),
    }
}

pub struct App<A: FamilyApi> {
    api: A,
    config: Config,
    state: AppState,
    notifications: Notifications,
}

impl<A: FamilyApi> App<A> {
    pub fn new(api: A, config: Config) -> Self {
        Self {
            api,
            config,
            state: AppState::default(),
            notifications: Notifications::default(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    /// Fetches statistics and family data concurrently and replaces the
    /// whole state. Failures leave defaults in place and are reported as
    /// notifications; this never fails.
    pub async fn load(&mut self) {
        let (statistics, family) = tokio::join!(self.api.statistics(), self.api.family());
        let mut state = AppState::default();

        match statistics {
            Ok(stats) => state.statistics = stats,
            Err(err) => {
                error!(error = %err, "loading statistics failed");
                self.notifications
                    .error(format!("Error loading statistics: {err}"));
            }
        }
        match family {
            Ok(family) => state.family = family,
            Err(err) => {
                error!(error = %err, "loading family data failed");
                self.notifications.error(LOAD_FAILED);
            }
        }

        state.rebuild_graph();
        info!(
            people = state.family.people.len(),
            relationships = state.family.relationships.len(),
            events = state.family.events.len(),
            "family data loaded"
        );
        self.state = state;
    }

    /// Replaces the state with an offline snapshot.
    pub fn load_snapshot(&mut self, family: FamilySnapshot) {
        self.state = AppState::from_snapshot(family);
    }

    fn settle<T>(
        &mut self,
        result: ApiResult<T>,
        success: &str,
        failure: &str,
    ) -> Result<T, ActionError> {
        match result {
            Ok(value) => {
                self.notifications.success(success);
                Ok(value)
            }
            Err(err) => {
                self.notifications.error(format!("{failure}: {err}"));
                Err(err.into())
            }
        }
    }

    fn check(errors: Vec<FieldError>) -> Result<(), ActionError> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ActionError::Invalid(errors))
        }
    }

    pub async fn add_person(&mut self, person: Person) -> Result<Person, ActionError> {
        Self::check(validate_person(&person))?;
        let result = self.api.create_person(&person).await;
        let created = self.settle(
            result,
            "Anggota keluarga berhasil ditambahkan!",
            "Gagal menambahkan anggota keluarga",
        )?;
        self.state.family.people.push(created.clone());
        self.state.rebuild_graph();
        Ok(created)
    }

    pub async fn update_person(&mut self, id: &str, mut person: Person) -> Result<(), ActionError> {
        Self::check(validate_person(&person))?;
        let result = self.api.update_person(id, &person).await;
        self.settle(
            result,
            "Anggota keluarga berhasil diperbarui!",
            "Gagal memperbarui anggota keluarga",
        )?;
        person.id = id.to_string();
        if let Some(slot) = self.state.family.people.iter_mut().find(|p| p.id == id) {
            *slot = person;
            self.state.rebuild_graph();
        }
        Ok(())
    }

    /// Deletes a person; the server drops their relationships too, so the
    /// local copy does the same.
    pub async fn delete_person(&mut self, id: &str) -> Result<(), ActionError> {
        let result = self.api.delete_person(id).await;
        self.settle(
            result,
            "Anggota keluarga berhasil dihapus!",
            "Gagal menghapus anggota keluarga",
        )?;
        self.state.family.people.retain(|p| p.id != id);
        self.state.family.relationships.retain(|r| !r.involves(id));
        self.state.rebuild_graph();
        Ok(())
    }

    pub async fn add_relationship(
        &mut self,
        relationship: Relationship,
    ) -> Result<Relationship, ActionError> {
        Self::check(validate_relationship(&relationship))?;
        let result = self.api.create_relationship(&relationship).await;
        let created = self.settle(
            result,
            "Hubungan berhasil ditambahkan!",
            "Gagal menambahkan hubungan",
        )?;
        self.state.family.relationships.push(created.clone());
        self.state.rebuild_graph();
        Ok(created)
    }

    pub async fn delete_relationship(&mut self, id: &str) -> Result<(), ActionError> {
        let result = self.api.delete_relationship(id).await;
        self.settle(result, "Hubungan berhasil dihapus!", "Gagal menghapus hubungan")?;
        self.state.family.relationships.retain(|r| r.id != id);
        self.state.rebuild_graph();
        Ok(())
    }

    pub async fn add_event(&mut self, event: Event) -> Result<Event, ActionError> {
        Self::check(validate_event(&event))?;
        let result = self.api.create_event(&event).await;
        let created = self.settle(result, "Acara berhasil ditambahkan!", "Gagal menambahkan acara")?;
        self.state.family.events.push(created.clone());
        Ok(created)
    }

    pub async fn update_event(&mut self, id: &str, mut event: Event) -> Result<(), ActionError> {
        Self::check(validate_event(&event))?;
        let result = self.api.update_event(id, &event).await;
        self.settle(result, "Acara berhasil diperbarui!", "Gagal memperbarui acara")?;
        event.id = id.to_string();
        if let Some(slot) = self.state.family.events.iter_mut().find(|e| e.id == id) {
            *slot = event;
        }
        Ok(())
    }

    pub async fn delete_event(&mut self, id: &str) -> Result<(), ActionError> {
        let result = self.api.delete_event(id).await;
        self.settle(result, "Acara berhasil dihapus!", "Gagal menghapus acara")?;
        self.state.family.events.retain(|e| e.id != id);
        Ok(())
    }

    /// Relationships of one member, skipping those whose other side is unknown.
    pub fn member_relationships(&self, member_id: &str) -> Vec<MemberRelation<'_>> {
        self.state
            .family
            .relationships
            .iter()
            .filter(|rel| rel.involves(member_id))
            .filter_map(|rel| {
                let member_is_first = rel.person_id_1 == member_id;
                let other_id = if member_is_first {
                    &rel.person_id_2
                } else {
                    &rel.person_id_1
                };
                let other = self.state.person(other_id)?;
                Some(MemberRelation {
                    relationship_id: &rel.id,
                    other,
                    label: relation_label(&rel.kind, member_is_first),
                })
            })
            .collect()
    }

    pub fn tree_layout(&self) -> FamilyLayout {
        compute_family_layout(
            &self.state.graph,
            &self.state.family.relationships,
            &self.config.theme,
            &self.config.layout,
        )
    }

    pub fn timeline_layout(&self) -> TimelineLayout {
        layout_timeline(
            &self.state.family.events,
            &self.state.graph,
            &self.config.theme,
            &self.config.layout,
        )
    }

    pub fn render_tree(&self) -> String {
        render_family_svg(&self.tree_layout(), &self.config.theme, &self.config.layout)
    }

    pub fn render_timeline(&self) -> String {
        render_timeline_svg(
            &self.timeline_layout(),
            &self.config.theme,
            &self.config.layout,
        )
    }
}
