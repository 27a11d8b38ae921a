//! # Scorer Module
//!
//! Runs the applicable detector over every enabled operation point of a
//! module and folds the outcomes into [`ScoringResult`]s.
//!
//! Independent operation points have no data dependencies, so they are
//! evaluated concurrently under a semaphore-bounded pool; results are
//! collected back in the original operation-point order regardless of
//! completion order. Each detection is wrapped in the configured timeout, and
//! a timeout, panic, or error outcome degrades to a zero-score result for
//! that point only — sibling points always complete.

use crate::detectors::{ArtifactHandle, KnowledgePointDetector, finalize_result};
use crate::params::ParameterSet;
use crate::types::{KnowledgePointResult, QuestionScoreResult, ScoringResult};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use util::exam_model::ExamModule;
use util::grading_config::GradingConfig;

/// Score one module of the exam against the submission rooted at `base_path`.
pub async fn score_module(
    module: &ExamModule,
    detector: Arc<dyn KnowledgePointDetector>,
    base_path: &Path,
    config: &GradingConfig,
) -> ScoringResult {
    let mut result = ScoringResult::started(module.name.clone());
    let semaphore = Arc::new(Semaphore::new(config.limits.max_concurrent_checks.max(1)));
    let deadline = Duration::from_secs(config.limits.detection_timeout_secs.max(1));

    for question in module.questions.iter().filter(|q| q.is_enabled) {
        let artifact = ArtifactHandle::for_question(base_path, question, config);
        let enabled_points: Vec<_> = question
            .operation_points
            .iter()
            .filter(|p| p.is_enabled)
            .collect();

        let mut handles = Vec::with_capacity(enabled_points.len());
        for point in &enabled_points {
            let operation_type = point.knowledge_type(module.module_type).to_string();
            let params = ParameterSet::from_operation_point(point);
            let artifact = artifact.clone();
            let detector = Arc::clone(&detector);
            let semaphore = Arc::clone(&semaphore);

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                match timeout(
                    deadline,
                    detector.detect_one(&operation_type, &params, &artifact),
                )
                .await
                {
                    Ok(result) => result,
                    Err(_) => KnowledgePointResult::failed(
                        &operation_type,
                        format!("detection timed out after {}s", deadline.as_secs()),
                    ),
                }
            }));
        }

        // join_all preserves spawn order, so the output list is stable no
        // matter which checks finish first.
        let outcomes = futures::future::join_all(handles).await;

        let mut question_total = 0.0;
        let mut question_achieved = 0.0;
        let mut all_correct = !enabled_points.is_empty();

        for (point, joined) in enabled_points.iter().zip(outcomes) {
            let mut kp_result = match joined {
                Ok(kp_result) => kp_result,
                Err(e) => KnowledgePointResult::failed(
                    point.knowledge_type(module.module_type),
                    format!("detection task failed: {e}"),
                ),
            };
            finalize_result(&mut kp_result, point);
            kp_result.question_id = Some(question.id.clone());

            question_total += kp_result.total_score;
            question_achieved += kp_result.achieved_score;
            if !kp_result.is_correct {
                all_correct = false;
            }
            result.knowledge_point_results.push(kp_result);
        }

        result.question_results.push(QuestionScoreResult {
            question_id: question.id.clone(),
            question_title: question.title.clone(),
            total_score: question_total,
            achieved_score: question_achieved,
            is_correct: all_correct,
        });
        result.total_score += question_total;
        result.achieved_score += question_achieved;

        if config.detection.detailed_logging {
            tracing::debug!(
                question = %question.title,
                achieved = question_achieved,
                total = question_total,
                "scored question"
            );
        }
    }

    result.is_success = true;
    result.end_time = Utc::now();
    tracing::info!(
        module = %module.name,
        achieved = result.achieved_score,
        total = result.total_score,
        points = result.knowledge_point_results.len(),
        "scored module"
    );
    result
}

/// Merge per-module results into one whole-submission result.
pub fn combine_results(results: &[ScoringResult], exam_name: &str) -> ScoringResult {
    let mut combined = ScoringResult::started(exam_name.to_string());

    if results.is_empty() {
        combined.error_message = Some("no module results to combine".to_string());
        combined.end_time = Utc::now();
        return combined;
    }

    combined.start_time = results
        .iter()
        .map(|r| r.start_time)
        .min()
        .unwrap_or(combined.start_time);
    combined.end_time = results
        .iter()
        .map(|r| r.end_time)
        .max()
        .unwrap_or(combined.end_time);
    combined.total_score = results.iter().map(|r| r.total_score).sum();
    combined.achieved_score = results.iter().map(|r| r.achieved_score).sum();
    combined.is_success = results.iter().all(|r| r.is_success);

    let messages: Vec<&str> = results
        .iter()
        .filter_map(|r| r.error_message.as_deref())
        .collect();
    if !messages.is_empty() {
        combined.error_message = Some(messages.join("; "));
    }

    for result in results {
        combined
            .question_results
            .extend(result.question_results.iter().cloned());
        combined
            .knowledge_point_results
            .extend(result.knowledge_point_results.iter().cloned());
    }
    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use util::exam_model::{ModuleType, OperationPoint, Question};

    /// Test detector driven entirely by the operation-type tag.
    struct ScriptedDetector;

    #[async_trait]
    impl KnowledgePointDetector for ScriptedDetector {
        fn module_type(&self) -> ModuleType {
            ModuleType::Windows
        }

        async fn detect_one(
            &self,
            operation_type: &str,
            _params: &ParameterSet,
            _artifact: &ArtifactHandle,
        ) -> KnowledgePointResult {
            match operation_type {
                "pass" => KnowledgePointResult {
                    knowledge_point_type: operation_type.to_string(),
                    is_correct: true,
                    ..Default::default()
                },
                "slow-pass" => {
                    tokio::time::sleep(Duration::from_millis(150)).await;
                    KnowledgePointResult {
                        knowledge_point_type: operation_type.to_string(),
                        is_correct: true,
                        ..Default::default()
                    }
                }
                "hang" => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    unreachable!("the timeout should have fired")
                }
                "explode" => panic!("detector blew up"),
                _ => KnowledgePointResult::failed(operation_type, "scripted failure"),
            }
        }
    }

    fn operation(id: &str, tag: &str, score: f64) -> OperationPoint {
        OperationPoint {
            id: id.to_string(),
            name: tag.to_string(),
            description: String::new(),
            score,
            order: 0,
            is_enabled: true,
            module_type: Some(ModuleType::Windows),
            windows_operation_type: Some(tag.to_string()),
            power_point_knowledge_type: None,
            word_knowledge_type: None,
            excel_knowledge_type: None,
            parameters: vec![],
        }
    }

    fn module_with(operations: Vec<OperationPoint>) -> ExamModule {
        ExamModule {
            id: "m-1".to_string(),
            name: "Windows".to_string(),
            description: String::new(),
            module_type: ModuleType::Windows,
            score: 0.0,
            order: 0,
            is_enabled: true,
            questions: vec![Question {
                id: "q-1".to_string(),
                title: "Question 1".to_string(),
                content: String::new(),
                score: 10.0,
                order: 0,
                is_enabled: true,
                csharp_question_type: None,
                program_input: None,
                expected_output: None,
                code_file_path: None,
                document_file_path: None,
                operation_points: operations,
            }],
        }
    }

    fn fast_config() -> GradingConfig {
        let mut config = GradingConfig::default_config();
        config.limits.detection_timeout_secs = 1;
        config
    }

    #[tokio::test]
    async fn test_score_arithmetic() {
        let module = module_with(vec![
            operation("op-1", "pass", 5.0),
            operation("op-2", "fail", 5.0),
        ]);
        let result = score_module(
            &module,
            Arc::new(ScriptedDetector),
            Path::new("."),
            &fast_config(),
        )
        .await;

        assert!(result.is_success);
        assert_eq!(result.total_score, 10.0);
        assert_eq!(result.achieved_score, 5.0);
        assert_eq!(result.score_rate(), 0.5);
        assert!(result.elapsed_ms() >= 0);
        assert_eq!(result.knowledge_point_results.len(), 2);
        assert!(result.knowledge_point_results[0].is_correct);
        assert!(!result.knowledge_point_results[1].is_correct);
    }

    #[tokio::test]
    async fn test_panicking_detector_is_isolated() {
        let module = module_with(vec![
            operation("op-1", "explode", 5.0),
            operation("op-2", "pass", 5.0),
        ]);
        let result = score_module(
            &module,
            Arc::new(ScriptedDetector),
            Path::new("."),
            &fast_config(),
        )
        .await;

        assert_eq!(result.knowledge_point_results.len(), 2);
        let exploded = &result.knowledge_point_results[0];
        assert!(!exploded.is_correct);
        assert!(exploded.error_message.as_deref().unwrap().contains("detection task failed"));
        assert!(result.knowledge_point_results[1].is_correct);
        assert_eq!(result.achieved_score, 5.0);
    }

    #[tokio::test]
    async fn test_hanging_detector_times_out_to_zero_score() {
        let module = module_with(vec![
            operation("op-1", "hang", 5.0),
            operation("op-2", "pass", 5.0),
        ]);
        let result = score_module(
            &module,
            Arc::new(ScriptedDetector),
            Path::new("."),
            &fast_config(),
        )
        .await;

        let hung = &result.knowledge_point_results[0];
        assert!(!hung.is_correct);
        assert!(hung.error_message.as_deref().unwrap().contains("timed out"));
        assert_eq!(result.achieved_score, 5.0);
    }

    #[tokio::test]
    async fn test_result_order_is_stable_despite_completion_order() {
        let module = module_with(vec![
            operation("op-1", "slow-pass", 1.0),
            operation("op-2", "pass", 1.0),
            operation("op-3", "pass", 1.0),
        ]);
        let result = score_module(
            &module,
            Arc::new(ScriptedDetector),
            Path::new("."),
            &fast_config(),
        )
        .await;

        let ids: Vec<_> = result
            .knowledge_point_results
            .iter()
            .map(|r| r.operation_point_id.clone().unwrap())
            .collect();
        assert_eq!(ids, vec!["op-1", "op-2", "op-3"]);
    }

    #[tokio::test]
    async fn test_disabled_points_and_questions_are_skipped() {
        let mut disabled = operation("op-2", "pass", 5.0);
        disabled.is_enabled = false;
        let module = module_with(vec![operation("op-1", "pass", 5.0), disabled]);
        let result = score_module(
            &module,
            Arc::new(ScriptedDetector),
            Path::new("."),
            &fast_config(),
        )
        .await;
        assert_eq!(result.knowledge_point_results.len(), 1);
        assert_eq!(result.total_score, 5.0);
    }

    #[tokio::test]
    async fn test_question_without_points_scores_zero_and_incorrect() {
        let module = module_with(vec![]);
        let result = score_module(
            &module,
            Arc::new(ScriptedDetector),
            Path::new("."),
            &fast_config(),
        )
        .await;
        assert_eq!(result.total_score, 0.0);
        assert_eq!(result.score_rate(), 0.0);
        assert!(!result.question_results[0].is_correct);
    }

    #[tokio::test]
    async fn test_combine_results_sums_and_merges() {
        let module_a = module_with(vec![operation("op-1", "pass", 5.0)]);
        let module_b = module_with(vec![operation("op-2", "fail", 5.0)]);
        let config = fast_config();
        let a = score_module(&module_a, Arc::new(ScriptedDetector), Path::new("."), &config).await;
        let b = score_module(&module_b, Arc::new(ScriptedDetector), Path::new("."), &config).await;

        let combined = combine_results(&[a, b], "Exam");
        assert_eq!(combined.total_score, 10.0);
        assert_eq!(combined.achieved_score, 5.0);
        assert!(combined.is_success);
        assert_eq!(combined.knowledge_point_results.len(), 2);
        assert_eq!(combined.subject, "Exam");
    }

    #[test]
    fn test_combine_results_empty_input() {
        let combined = combine_results(&[], "Exam");
        assert!(!combined.is_success);
        assert!(combined.error_message.unwrap().contains("no module results"));
    }
}
