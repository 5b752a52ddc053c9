use crate::infra::{in_memory_service, load_rules, parse_answers};
use clap::Args;
use std::path::PathBuf;
use umkm_assessment::error::AppError;
use umkm_assessment::workflows::assessment::{
    standard_template_id, AnswerSubmission, AnswerValue, AssessmentResult, ChoiceAnswer,
    QuestionId, ScoringConfig, UserId,
};

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON file with `[{ "question_id": ..., "answer_value": ... }]` answers
    #[arg(long)]
    pub(crate) responses: PathBuf,
    /// Recommendation rule catalog (CSV). Defaults to the bundled rules.
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
    /// Print the full result as JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Recommendation rule catalog (CSV). Defaults to the bundled rules.
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
}

const CLI_USER: &str = "cli-operator";

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        responses,
        rules,
        json,
    } = args;

    let answers = parse_answers(&std::fs::read_to_string(responses)?)?;
    let result = score_answers(rules, answers)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        render_result(&result);
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    println!("UMKM assessment demo");

    for (persona, answers) in [
        ("Warung makan rumahan", early_stage_answers()),
        ("Produsen keripik dengan reseller", growing_answers()),
    ] {
        println!("\n{persona}");
        let result = score_answers(args.rules.clone(), answers)?;
        render_result(&result);
    }

    Ok(())
}

fn score_answers(
    rules: Option<PathBuf>,
    answers: Vec<AnswerSubmission>,
) -> Result<AssessmentResult, AppError> {
    let rules = load_rules(rules.as_deref())?;
    let service = in_memory_service(rules, ScoringConfig::default())?;
    let user = UserId::new(CLI_USER);

    let assessment = service.start(&user, &standard_template_id())?;
    service.record_responses(&user, &assessment.id, answers)?;
    Ok(service.submit(&user, &assessment.id)?)
}

fn render_result(result: &AssessmentResult) {
    let score = &result.score;
    println!(
        "- Total score {:.2} -> {} ({})",
        score.total_score, result.level_details.name, result.level_details.range
    );
    println!("  {}", result.level_details.description);
    println!("  Confidence {:.0}% of questions answered", score.confidence_score);

    println!("  Category breakdown:");
    for (id, category) in &score.category_scores {
        println!(
            "    - {} [{}]: {:.2} / {:.2} ({:.0}%)",
            category.name,
            id,
            category.score,
            category.max_score,
            category.percentage()
        );
    }

    if result.recommendations.is_empty() {
        println!("  Recommendations: none matched");
        return;
    }

    println!("  Recommendations:");
    for recommendation in &result.recommendations {
        println!(
            "    - [{}] {} ({})",
            recommendation.priority.label(),
            recommendation.title,
            recommendation.category
        );
        for item in &recommendation.action_items {
            println!("        * {item}");
        }
    }
}

fn answer(question_id: &str, value: AnswerValue) -> AnswerSubmission {
    AnswerSubmission {
        question_id: QuestionId::new(question_id),
        answer_value: Some(value),
    }
}

fn choice(value: f64, label: &str) -> AnswerValue {
    AnswerValue::Choice(ChoiceAnswer {
        value: Some(value),
        label: Some(label.to_string()),
    })
}

fn early_stage_answers() -> Vec<AnswerSubmission> {
    vec![
        answer("q-pencatatan-kas", AnswerValue::Number(1.0)),
        answer("q-rekening-terpisah", AnswerValue::Boolean(false)),
        answer("q-akses-modal", choice(1.0, "Pinjaman keluarga")),
        answer("q-target-pelanggan", AnswerValue::Number(2.0)),
        answer("q-kanal-penjualan", choice(1.0, "Hanya di toko")),
        answer("q-sop-produksi", AnswerValue::Boolean(false)),
        answer("q-pembayaran-digital", AnswerValue::Boolean(true)),
        answer(
            "q-cerita-usaha",
            AnswerValue::Text("Warung nasi di depan rumah sejak 2019".to_string()),
        ),
    ]
}

fn growing_answers() -> Vec<AnswerSubmission> {
    vec![
        answer("q-pencatatan-kas", AnswerValue::Number(4.0)),
        answer("q-rekening-terpisah", AnswerValue::Boolean(true)),
        answer("q-akses-modal", choice(2.0, "Koperasi")),
        answer("q-target-pelanggan", AnswerValue::Number(4.0)),
        answer("q-kanal-penjualan", choice(3.0, "Marketplace")),
        answer("q-sop-produksi", AnswerValue::Boolean(true)),
        answer("q-stok-bahan", AnswerValue::Text("3".to_string())),
        answer("q-pembayaran-digital", AnswerValue::Boolean(true)),
        answer("q-media-sosial", AnswerValue::Number(3.0)),
    ]
}
