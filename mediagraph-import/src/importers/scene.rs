use mediagraph_catalog::{
    EntityKind, MovieScene, Scene, SceneMarker, SceneMarkerRecord, SceneMovieRecord, SceneRecord,
};
use mediagraph_db::{Repository, TxnScope};

use crate::config::{ImportContext, MissingRefBehaviour};
use crate::error::ImportError;
use crate::importer::Importer;
use crate::references::References;

pub struct SceneImporter {
    scene: Scene,
    studio_name: Option<String>,
    gallery_checksums: Vec<String>,
    performer_names: Vec<String>,
    movie_refs: Vec<SceneMovieRecord>,
    tag_names: Vec<String>,
    gallery_ids: Vec<i64>,
    performer_ids: Vec<i64>,
    movies: Vec<MovieScene>,
    tag_ids: Vec<i64>,
    refs: References,
}

impl SceneImporter {
    /// Builds the scene row; its markers are returned separately because they
    /// are imported only after the scene has committed.
    pub fn new(
        checksum: String,
        path: Option<String>,
        record: SceneRecord,
        ctx: &ImportContext,
    ) -> (Self, Vec<SceneMarkerRecord>) {
        let file = record.file.unwrap_or_default();
        let scene = Scene {
            id: 0,
            checksum,
            oshash: record.oshash,
            path: path.unwrap_or_default(),
            title: record.title,
            details: record.details,
            url: record.url,
            date: record.date,
            rating: record.rating,
            organized: record.organized,
            o_counter: record.o_counter.max(0),
            size: file.size,
            duration: file.duration,
            width: file.width,
            height: file.height,
            studio_id: None,
            created_at: ctx.timestamp(record.created_at.as_deref()),
            updated_at: ctx.timestamp(record.updated_at.as_deref()),
        };
        let importer = Self {
            scene,
            studio_name: record.studio,
            gallery_checksums: record.galleries,
            performer_names: record.performers,
            movie_refs: record.movies,
            tag_names: record.tags,
            gallery_ids: Vec::new(),
            performer_ids: Vec::new(),
            movies: Vec::new(),
            tag_ids: Vec::new(),
            refs: References::new(*ctx, EntityKind::Scene),
        };
        (importer, record.markers)
    }
}

impl Importer for SceneImporter {
    const KIND: EntityKind = EntityKind::Scene;

    fn pre_import(&mut self, txn: &TxnScope<'_>) -> Result<(), ImportError> {
        if let Some(studio) = self.studio_name.as_deref() {
            self.scene.studio_id = self.refs.studio(txn, studio)?;
        }
        self.gallery_ids = self.refs.galleries(txn, &self.gallery_checksums)?;
        self.performer_ids = self.refs.performers(txn, &self.performer_names)?;

        self.movies.clear();
        for movie in &self.movie_refs {
            if let Some(movie_id) = self.refs.movie(txn, &movie.movie_name)? {
                self.movies.push(MovieScene {
                    movie_id,
                    scene_index: movie.scene_index,
                });
            }
        }

        self.tag_ids = self.refs.tags(txn, &self.tag_names)?;
        Ok(())
    }

    fn name(&self) -> String {
        if self.scene.path.is_empty() {
            self.scene.checksum.clone()
        } else {
            self.scene.path.clone()
        }
    }

    fn find_existing_id(&self, txn: &TxnScope<'_>) -> Result<Option<i64>, ImportError> {
        Ok(txn
            .scenes()
            .find_by_checksum(&self.scene.checksum)?
            .map(|s| s.id))
    }

    fn create(&mut self, txn: &TxnScope<'_>) -> Result<i64, ImportError> {
        Ok(txn.scenes().create(&self.scene)?.id)
    }

    fn update(&mut self, txn: &TxnScope<'_>, id: i64) -> Result<(), ImportError> {
        let scene = Scene {
            id,
            ..self.scene.clone()
        };
        txn.scenes().update_full(&scene)?;
        Ok(())
    }

    fn post_import(&mut self, txn: &TxnScope<'_>, id: i64) -> Result<(), ImportError> {
        let scenes = txn.scenes();
        scenes.update_performers(id, &self.performer_ids)?;
        scenes.update_movies(id, &self.movies)?;
        scenes.update_galleries(id, &self.gallery_ids)?;
        scenes.update_tags(id, &self.tag_ids)?;
        Ok(())
    }

    fn take_warnings(&mut self) -> Vec<String> {
        self.refs.take_warnings()
    }
}

/// Imports one marker of an already-stored scene.
pub struct SceneMarkerImporter {
    marker: SceneMarker,
    primary_tag: String,
    tag_names: Vec<String>,
    tag_ids: Vec<i64>,
    refs: References,
}

impl SceneMarkerImporter {
    pub fn new(scene_id: i64, record: SceneMarkerRecord, ctx: &ImportContext) -> Self {
        let marker = SceneMarker {
            id: 0,
            scene_id,
            title: record.title,
            seconds: record.seconds,
            primary_tag_id: 0,
            created_at: ctx.timestamp(record.created_at.as_deref()),
            updated_at: ctx.timestamp(record.updated_at.as_deref()),
        };
        Self {
            marker,
            primary_tag: record.primary_tag,
            tag_names: record.tags,
            tag_ids: Vec::new(),
            refs: References::new(*ctx, EntityKind::SceneMarker),
        }
    }
}

impl Importer for SceneMarkerImporter {
    const KIND: EntityKind = EntityKind::SceneMarker;

    fn pre_import(&mut self, txn: &TxnScope<'_>) -> Result<(), ImportError> {
        // A marker cannot exist without its primary tag.
        let policy = match self.refs.ctx().missing_refs {
            MissingRefBehaviour::Ignore => MissingRefBehaviour::Fail,
            other => other,
        };
        self.marker.primary_tag_id = self
            .refs
            .tag_with(txn, &self.primary_tag, policy)?
            .ok_or_else(|| ImportError::MissingReferenceConflict {
                kind: EntityKind::Tag,
                name: self.primary_tag.clone(),
            })?;

        let primary = self.marker.primary_tag_id;
        self.tag_ids = self
            .refs
            .tags(txn, &self.tag_names)?
            .into_iter()
            .filter(|id| *id != primary)
            .collect();
        Ok(())
    }

    fn name(&self) -> String {
        format!("{} @ {}", self.marker.title, self.marker.seconds)
    }

    fn find_existing_id(&self, txn: &TxnScope<'_>) -> Result<Option<i64>, ImportError> {
        let existing = txn
            .scene_markers()
            .find_by_scene_id(self.marker.scene_id)?
            .into_iter()
            .find(|m| {
                m.seconds == self.marker.seconds && m.primary_tag_id == self.marker.primary_tag_id
            });
        Ok(existing.map(|m| m.id))
    }

    fn create(&mut self, txn: &TxnScope<'_>) -> Result<i64, ImportError> {
        Ok(txn.scene_markers().create(&self.marker)?.id)
    }

    fn update(&mut self, txn: &TxnScope<'_>, id: i64) -> Result<(), ImportError> {
        let marker = SceneMarker {
            id,
            ..self.marker.clone()
        };
        txn.scene_markers().update_full(&marker)?;
        Ok(())
    }

    fn post_import(&mut self, txn: &TxnScope<'_>, id: i64) -> Result<(), ImportError> {
        txn.scene_markers().update_tags(id, &self.tag_ids)?;
        Ok(())
    }

    fn take_warnings(&mut self) -> Vec<String> {
        self.refs.take_warnings()
    }
}
