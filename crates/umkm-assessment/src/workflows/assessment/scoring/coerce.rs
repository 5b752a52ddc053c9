use super::super::domain::{AnswerValue, Question, QuestionKind};
use super::config::ScoringConfig;

/// Raw points for an answer. Malformed input coerces to zero instead of failing the assessment.
pub(crate) fn raw_score(question: &Question, answer: Option<&AnswerValue>) -> f64 {
    let Some(answer) = answer else {
        return 0.0;
    };

    match question.kind {
        QuestionKind::Scale => coerce_number(answer),
        QuestionKind::Boolean => coerce_boolean(answer),
        QuestionKind::MultipleChoice => coerce_choice(answer),
        QuestionKind::Text | QuestionKind::Unsupported => 0.0,
    }
}

/// Ceiling for the raw score; zero marks a question that cannot be scored.
pub(crate) fn max_raw_score(question: &Question, config: &ScoringConfig) -> f64 {
    match question.kind {
        QuestionKind::Scale => {
            let override_max = question
                .options
                .as_ref()
                .and_then(|options| options.max)
                .filter(|max| max.is_finite() && *max > 0.0);

            match override_max {
                Some(max) if config.honor_scale_max_override => max,
                _ => finite_or_zero(config.default_scale_max).max(0.0),
            }
        }
        QuestionKind::Boolean => 1.0,
        QuestionKind::MultipleChoice => {
            let best = question
                .options
                .iter()
                .flat_map(|options| options.choices.iter())
                .filter_map(|choice| choice.value)
                .filter(|value| value.is_finite())
                .fold(0.0_f64, f64::max);

            if best > 0.0 {
                best
            } else {
                1.0
            }
        }
        QuestionKind::Text | QuestionKind::Unsupported => 0.0,
    }
}

/// Weighted contributions only count for finite, positive weights.
pub(crate) fn effective_weight(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}

pub(crate) fn normalized_score(raw: f64, max_raw: f64) -> f64 {
    if max_raw > 0.0 {
        ((raw / max_raw) * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

pub(crate) fn coerce_number(answer: &AnswerValue) -> f64 {
    let value = match answer {
        AnswerValue::Number(value) => *value,
        AnswerValue::Boolean(flag) => {
            if *flag {
                1.0
            } else {
                0.0
            }
        }
        AnswerValue::Text(text) => text.trim().parse::<f64>().unwrap_or(0.0),
        AnswerValue::Choice(_) => 0.0,
    };
    finite_or_zero(value)
}

pub(crate) fn coerce_boolean(answer: &AnswerValue) -> f64 {
    match answer {
        AnswerValue::Boolean(true) => 1.0,
        AnswerValue::Text(text) if text == "true" => 1.0,
        _ => 0.0,
    }
}

pub(crate) fn coerce_choice(answer: &AnswerValue) -> f64 {
    match answer {
        AnswerValue::Choice(choice) => choice.value.map(finite_or_zero).unwrap_or(0.0),
        other => coerce_number(other),
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
