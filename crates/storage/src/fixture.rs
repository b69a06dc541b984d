//! Bundled sample questions, served when no hosted store is configured.

use crate::repository::QuestionRecord;

/// The fixed fallback dataset. Answers are opaque markup, mirroring what the
/// hosted store serves.
#[must_use]
pub fn sample_records() -> Vec<QuestionRecord> {
    vec![
        QuestionRecord {
            id: "1".to_owned(),
            question: "What are the main building blocks of a component-based UI?".to_owned(),
            answer: "<ul><li>Components</li><li>Props</li><li>State</li>\
                     <li>Lifecycle hooks</li></ul>"
                .to_owned(),
            known: false,
        },
        QuestionRecord {
            id: "2".to_owned(),
            question: "Explain the concept of closures.".to_owned(),
            answer: "<p>A closure is a function bundled together with references to its \
                     surrounding state, captured at the point the function is created.</p>"
                .to_owned(),
            known: false,
        },
        QuestionRecord {
            id: "3".to_owned(),
            question: "What is the difference between block scoping and function scoping?"
                .to_owned(),
            answer: "<p>Block-scoped bindings are visible only inside the enclosing block; \
                     function-scoped bindings are hoisted to the whole enclosing function, \
                     which makes them easier to misuse.</p>"
                .to_owned(),
            known: false,
        },
        QuestionRecord {
            id: "4".to_owned(),
            question: "Describe the box model in CSS.".to_owned(),
            answer: "<ul><li><strong>Content</strong>: the inner content of the box</li>\
                     <li><strong>Padding</strong>: space between content and border</li>\
                     <li><strong>Border</strong>: drawn around the padding</li>\
                     <li><strong>Margin</strong>: space outside the border</li></ul>"
                .to_owned(),
            known: false,
        },
        QuestionRecord {
            id: "5".to_owned(),
            question: "What does static typing add over dynamic typing?".to_owned(),
            answer: "<ul><li>Compile-time error checking</li><li>Better editor support</li>\
                     <li>Safer refactoring</li><li>Types as documentation</li></ul>"
                .to_owned(),
            known: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_ids_are_unique() {
        let records = sample_records();
        for (i, record) in records.iter().enumerate() {
            assert!(
                records[i + 1..].iter().all(|other| other.id != record.id),
                "duplicate fixture id {}",
                record.id
            );
        }
    }

    #[test]
    fn sample_questions_start_unknown() {
        assert!(sample_records().iter().all(|r| !r.known));
    }

    #[test]
    fn sample_records_convert_to_domain_questions() {
        for record in sample_records() {
            record.into_question().unwrap();
        }
    }
}
