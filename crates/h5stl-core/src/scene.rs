//! The single "currently displayed model" slot and the scene seam it
//! writes through.

use crate::mesh::{DisplayTransform, EdgeGeometry, ModelId, RenderableModel, SolidGeometry};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Solid,
    Edges,
}

#[derive(Debug, Clone)]
pub enum SceneObject {
    Solid {
        model: ModelId,
        geometry: Arc<SolidGeometry>,
        transform: DisplayTransform,
    },
    Edges {
        model: ModelId,
        geometry: Arc<EdgeGeometry>,
        transform: DisplayTransform,
    },
}

impl SceneObject {
    pub fn solid_of(model: &RenderableModel) -> Self {
        SceneObject::Solid {
            model: model.id,
            geometry: Arc::clone(&model.solid),
            transform: model.transform,
        }
    }

    pub fn edges_of(model: &RenderableModel) -> Self {
        SceneObject::Edges {
            model: model.id,
            geometry: Arc::clone(&model.edges),
            transform: model.transform,
        }
    }

    pub fn model(&self) -> ModelId {
        match self {
            SceneObject::Solid { model, .. } | SceneObject::Edges { model, .. } => *model,
        }
    }

    pub fn kind(&self) -> ObjectKind {
        match self {
            SceneObject::Solid { .. } => ObjectKind::Solid,
            SceneObject::Edges { .. } => ObjectKind::Edges,
        }
    }

    pub fn transform(&self) -> DisplayTransform {
        match self {
            SceneObject::Solid { transform, .. } | SceneObject::Edges { transform, .. } => {
                *transform
            }
        }
    }
}

/// Whatever draws the objects.
pub trait Scene {
    fn add(&mut self, object: SceneObject) -> ObjectId;
    fn remove(&mut self, id: ObjectId);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneEvent {
    Added(ObjectId, ObjectKind, ModelId),
    Removed(ObjectId),
}

/// Scene without a rendering surface. Records every mutation.
#[derive(Debug, Default)]
pub struct MemoryScene {
    next_id: u64,
    objects: Vec<(ObjectId, SceneObject)>,
    journal: Vec<SceneEvent>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter().map(|(_, obj)| obj)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn journal(&self) -> &[SceneEvent] {
        &self.journal
    }
}

impl Scene for MemoryScene {
    fn add(&mut self, object: SceneObject) -> ObjectId {
        self.next_id += 1;
        let id = ObjectId(self.next_id);
        self.journal
            .push(SceneEvent::Added(id, object.kind(), object.model()));
        self.objects.push((id, object));
        id
    }

    fn remove(&mut self, id: ObjectId) {
        self.objects.retain(|(oid, _)| *oid != id);
        self.journal.push(SceneEvent::Removed(id));
    }
}

/// Sequence number handed out when a workflow starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(pub u64);

/// Which of two overlapping workflows ends up displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttachPolicy {
    /// Every completed workflow is applied; the last to finish wins.
    #[default]
    LastCompleted,
    /// A result older than the one on screen is dropped.
    LastSubmitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    Applied,
    Superseded { current: Ticket },
}

#[derive(Debug)]
struct Attached {
    model: RenderableModel,
    ticket: Ticket,
    solid: ObjectId,
    edges: ObjectId,
}

/// Holds at most one attached model. Single writer.
#[derive(Debug, Default)]
pub struct DisplaySlot {
    current: Option<Attached>,
    issued: u64,
}

impl DisplaySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue_ticket(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    pub fn current(&self) -> Option<&RenderableModel> {
        self.current.as_ref().map(|a| &a.model)
    }

    pub fn current_ticket(&self) -> Option<Ticket> {
        self.current.as_ref().map(|a| a.ticket)
    }

    /// Replaces whatever is attached with `model`.
    pub fn attach<S: Scene + ?Sized>(&mut self, scene: &mut S, model: RenderableModel) {
        let ticket = self.issue_ticket();
        self.replace(scene, ticket, model);
    }

    pub fn attach_ticketed<S: Scene + ?Sized>(
        &mut self,
        scene: &mut S,
        ticket: Ticket,
        model: RenderableModel,
        policy: AttachPolicy,
    ) -> AttachOutcome {
        if policy == AttachPolicy::LastSubmitted {
            if let Some(current) = self.current_ticket().filter(|t| *t > ticket) {
                debug!(?ticket, ?current, "dropping result of an older request");
                return AttachOutcome::Superseded { current };
            }
        }
        self.replace(scene, ticket, model);
        AttachOutcome::Applied
    }

    fn replace<S>(&mut self, scene: &mut S, ticket: Ticket, model: RenderableModel)
    where
        S: Scene + ?Sized,
    {
        if let Some(prev) = self.current.take() {
            scene.remove(prev.solid);
            scene.remove(prev.edges);
            debug!(model = prev.model.id.0, "detached model");
        }

        let solid = scene.add(SceneObject::solid_of(&model));
        let edges = scene.add(SceneObject::edges_of(&model));
        info!(
            model = model.id.0,
            triangles = model.solid.triangle_count(),
            edge_segments = model.edges.segment_count(),
            "attached model"
        );
        self.current = Some(Attached {
            model,
            ticket,
            solid,
            edges,
        });
    }
}

/// A model built by a workflow, waiting to be attached.
#[derive(Debug, Clone)]
pub struct PreparedModel {
    pub ticket: Ticket,
    pub label: String,
    pub model: RenderableModel,
}

/// Scene plus display slot, owned by whoever drives the viewport.
#[derive(Debug)]
pub struct Viewport<S: Scene> {
    scene: S,
    slot: DisplaySlot,
    policy: AttachPolicy,
    label: Option<String>,
}

impl<S: Scene> Viewport<S> {
    pub fn new(scene: S) -> Self {
        Self::with_policy(scene, AttachPolicy::default())
    }

    pub fn with_policy(scene: S, policy: AttachPolicy) -> Self {
        Self {
            scene,
            slot: DisplaySlot::new(),
            policy,
            label: None,
        }
    }

    pub fn ticket(&mut self) -> Ticket {
        self.slot.issue_ticket()
    }

    pub fn attach(&mut self, model: RenderableModel) {
        self.slot.attach(&mut self.scene, model);
        self.label = None;
    }

    pub fn apply(&mut self, prepared: PreparedModel) -> AttachOutcome {
        let outcome = self.slot.attach_ticketed(
            &mut self.scene,
            prepared.ticket,
            prepared.model,
            self.policy,
        );
        if outcome == AttachOutcome::Applied {
            self.label = Some(prepared.label);
        }
        outcome
    }

    pub fn current(&self) -> Option<&RenderableModel> {
        self.slot.current()
    }

    pub fn current_label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn policy(&self) -> AttachPolicy {
        self.policy
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }
}
