//! The driver: an ordered list of gated stages, constraint routing, and runs
//! over a sequence of document sources.

use std::collections::BTreeMap;

use layered_theory::{AnnotationError, Constraint, DocumentId, DocumentTheory};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::stages;
use crate::{ConfigError, DocumentFailure, GatedStage, PipelineConfig, Sink, Stage, Tolerance};

/// Constraints keyed by the name of the stage that must realise them.
pub type StageConstraints = BTreeMap<String, Vec<Constraint>>;

/// One raw document fed to the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSource {
    pub id: DocumentId,
    pub text: String,
    #[serde(default)]
    pub constraints: StageConstraints,
}

impl DocumentSource {
    pub fn new(id: &str, text: &str) -> Self {
        Self {
            id: DocumentId::from(id),
            text: text.to_string(),
            constraints: StageConstraints::new(),
        }
    }

    /// Address `constraints` to `stage`, after any already addressed to it.
    pub fn with_constraints(mut self, stage: &str, constraints: Vec<Constraint>) -> Self {
        self.constraints
            .entry(stage.to_string())
            .or_default()
            .extend(constraints);
        self
    }
}

/// Document counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub failed: usize,
}

/// Stages applied strictly in order, each wrapped in its tolerance gate.
///
/// A stage only ever sees the constraints addressed to it, checked against
/// its own output. The first fatal error aborts the current document; the
/// next document starts fresh.
#[derive(Debug, Default)]
pub struct Pipeline {
    stages: Vec<GatedStage>,
}

impl Pipeline {
    /// A pipeline with no stages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in stage in standard order, all intolerant.
    pub fn standard() -> Self {
        Self {
            stages: stages::STANDARD_ORDER
                .iter()
                .filter_map(|name| stages::by_name(name))
                .map(|stage| GatedStage::new(stage, Tolerance::Intolerant))
                .collect(),
        }
    }

    /// Wire the built-in stages listed in `config`, in the listed order.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, ConfigError> {
        let mut pipeline = Self::new();
        for stage_config in &config.stages {
            if pipeline.stage(&stage_config.name).is_some() {
                return Err(ConfigError::DuplicateStage(stage_config.name.clone()));
            }
            let stage = stages::by_name(&stage_config.name)
                .ok_or_else(|| ConfigError::UnknownStage(stage_config.name.clone()))?;
            if let Some(model) = &stage_config.model {
                info!(stage = %stage_config.name, model = %model.display(), "stage model configured");
            }
            pipeline
                .stages
                .push(GatedStage::new(stage, stage_config.tolerance()));
        }
        debug!(stages = ?pipeline.stage_names(), "pipeline configured");
        Ok(pipeline)
    }

    /// Append a stage. Constraints addressed to a name go to the first stage
    /// carrying it; later stages with the same name run without constraints.
    pub fn with_stage(mut self, stage: impl Stage + 'static, tolerance: Tolerance) -> Self {
        self.stages.push(GatedStage::new(Box::new(stage), tolerance));
        self
    }

    pub fn stages(&self) -> &[GatedStage] {
        &self.stages
    }

    pub fn stage(&self, name: &str) -> Option<&GatedStage> {
        self.first_named(name).map(|position| &self.stages[position])
    }

    fn first_named(&self, name: &str) -> Option<usize> {
        self.stages.iter().position(|stage| stage.name() == name)
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(GatedStage::name).collect()
    }

    /// Address each constraint to the first stage accepting its kind.
    pub fn route(
        &self,
        constraints: impl IntoIterator<Item = Constraint>,
    ) -> Result<StageConstraints, AnnotationError> {
        let mut routed = StageConstraints::new();
        for constraint in constraints {
            let stage = self
                .stages
                .iter()
                .find(|stage| stage.accepts(constraint.kind()))
                .ok_or_else(|| AnnotationError::UnsupportedConstraint {
                    stage: "pipeline".to_string(),
                    kind: constraint.kind(),
                })?;
            routed
                .entry(stage.name().to_string())
                .or_default()
                .push(constraint);
        }
        Ok(routed)
    }

    pub fn run_document(&self, source: &DocumentSource) -> Result<DocumentTheory, DocumentFailure> {
        let theory = DocumentTheory::new(source.id.clone(), &source.text);
        self.run_theory(theory, &source.constraints)
    }

    /// Run every stage in order, starting from an existing theory.
    pub fn run_theory(
        &self,
        theory: DocumentTheory,
        constraints: &StageConstraints,
    ) -> Result<DocumentTheory, DocumentFailure> {
        for (name, addressed) in constraints {
            if let (None, Some(first)) = (self.stage(name), addressed.first()) {
                return Err(DocumentFailure {
                    document_id: theory.id().clone(),
                    stage: name.clone(),
                    error: AnnotationError::UnsupportedConstraint {
                        stage: name.clone(),
                        kind: first.kind(),
                    },
                });
            }
        }

        let mut theory = theory;
        for (position, stage) in self.stages.iter().enumerate() {
            let addressed = if self.first_named(stage.name()) == Some(position) {
                constraints
                    .get(stage.name())
                    .map(Vec::as_slice)
                    .unwrap_or(&[])
            } else {
                &[]
            };
            match stage.run(&theory, addressed) {
                Ok(next) => theory = next,
                Err(error) => {
                    return Err(DocumentFailure {
                        document_id: theory.id().clone(),
                        stage: stage.name().to_string(),
                        error,
                    })
                }
            }
        }
        Ok(theory)
    }

    /// Process `sources` one at a time, then call every `finish` hook once.
    pub fn run<I, S>(&self, sources: I, sink: &mut S) -> RunSummary
    where
        I: IntoIterator<Item = DocumentSource>,
        S: Sink + ?Sized,
    {
        let mut summary = RunSummary::default();
        for source in sources {
            let result = self.run_document(&source);
            deliver(result, sink, &mut summary);
        }
        self.finish();
        sink.finish();
        summary
    }

    /// Like [`Pipeline::run`], with documents processed on the rayon pool.
    /// The sink still sees documents in input order.
    pub fn run_parallel<S>(&self, sources: Vec<DocumentSource>, sink: &mut S) -> RunSummary
    where
        S: Sink + ?Sized,
    {
        let results: Vec<_> = sources
            .into_par_iter()
            .map(|source| self.run_document(&source))
            .collect();

        let mut summary = RunSummary::default();
        for result in results {
            deliver(result, sink, &mut summary);
        }
        self.finish();
        sink.finish();
        summary
    }

    /// Call every stage's `finish` hook once.
    pub fn finish(&self) {
        for stage in &self.stages {
            stage.finish();
        }
    }
}

fn deliver<S>(result: Result<DocumentTheory, DocumentFailure>, sink: &mut S, summary: &mut RunSummary)
where
    S: Sink + ?Sized,
{
    match result {
        Ok(theory) => {
            summary.processed += 1;
            sink.consume(theory);
        }
        Err(failure) => {
            error!(
                document = %failure.document_id,
                stage = %failure.stage,
                error = %failure.error,
                "document failed"
            );
            summary.failed += 1;
            sink.document_failed(&failure);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StageConfig;
    use layered_theory::{ConstraintKind, EntityType, NameConstraint, OffsetRange, ParseSpanConstraint};

    #[test]
    fn from_config_keeps_order_and_tolerance() {
        let config = PipelineConfig {
            stages: vec![StageConfig::new("sentences"), StageConfig::new("parser")],
        }
        .tolerate("parser");
        let pipeline = Pipeline::from_config(&config).unwrap();

        assert_eq!(pipeline.stage_names(), vec!["sentences", "parser"]);
        assert_eq!(pipeline.stage("parser").unwrap().tolerance(), Tolerance::Tolerant);
        assert_eq!(pipeline.stage("sentences").unwrap().tolerance(), Tolerance::Intolerant);
    }

    #[test]
    fn from_config_rejects_unknown_and_duplicate_stages() {
        let unknown = PipelineConfig {
            stages: vec![StageConfig::new("coref")],
        };
        assert!(matches!(
            Pipeline::from_config(&unknown),
            Err(ConfigError::UnknownStage(name)) if name == "coref"
        ));

        let duplicate = PipelineConfig {
            stages: vec![StageConfig::new("names"), StageConfig::new("names")],
        };
        assert!(matches!(
            Pipeline::from_config(&duplicate),
            Err(ConfigError::DuplicateStage(_))
        ));
    }

    #[test]
    fn constraints_go_to_the_first_stage_with_the_name() {
        use crate::stages::{ConstrainedNameFinder, SentenceSegmenter};

        let pipeline = Pipeline::new()
            .with_stage(SentenceSegmenter::new(), Tolerance::Intolerant)
            .with_stage(ConstrainedNameFinder, Tolerance::Intolerant)
            .with_stage(ConstrainedNameFinder, Tolerance::Intolerant);
        let source = DocumentSource::new("doc-1", "Kim smiled.").with_constraints(
            "names",
            vec![Constraint::ExactName(NameConstraint {
                range: OffsetRange::new(0, 2),
                entity_type: EntityType::Person,
                external_id: None,
            })],
        );

        let theory = pipeline.run_document(&source).unwrap();
        assert_eq!(theory.sentences()[0].names().len(), 1);

        let first = pipeline.stages()[1].stats();
        let second = pipeline.stages()[2].stats();
        assert_eq!((first.runs, first.satisfied), (1, 1));
        assert_eq!((second.runs, second.satisfied, second.unsatisfied), (1, 0, 0));
    }

    #[test]
    fn route_picks_the_accepting_stage() {
        let pipeline = Pipeline::standard();
        let routed = pipeline
            .route(vec![
                Constraint::ExactParseSpan(ParseSpanConstraint::new(0, 6)),
                Constraint::ExactName(NameConstraint {
                    range: OffsetRange::new(0, 2),
                    entity_type: EntityType::Person,
                    external_id: None,
                }),
            ])
            .unwrap();

        let stages: Vec<_> = routed.keys().map(String::as_str).collect();
        assert_eq!(stages, vec!["names", "parser"]);
    }

    #[test]
    fn route_without_accepting_stage_is_a_configuration_error() {
        let pipeline = Pipeline::from_config(&PipelineConfig {
            stages: vec![StageConfig::new("sentences")],
        })
        .unwrap();
        let err = pipeline
            .route(vec![Constraint::ExactParseSpan(ParseSpanConstraint::new(0, 6))])
            .unwrap_err();
        assert!(matches!(
            err,
            AnnotationError::UnsupportedConstraint { kind: ConstraintKind::ExactParseSpan, .. }
        ));
    }
}
