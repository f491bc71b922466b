//! Demonstration content used when fallback is switched on.

use crate::models::{Question, QuestionSet};

pub const DEMO_SUMMARY: &str = "This document covers fundamental concepts in computer science and biology, including cellular biology, programming paradigms, and algorithm analysis. The content provides a comprehensive overview of these topics with practical examples and theoretical foundations.";

fn question(id: u32, stem: &str, options: [&str; 4], correct_answer: usize, explanation: &str, topic: &str) -> Question {
    Question {
        id,
        question: stem.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_answer,
        explanation: explanation.to_string(),
        topic: Some(topic.to_string()),
    }
}

fn demo_questions() -> Vec<Question> {
    vec![
        question(
            1,
            "What is the primary function of mitochondria in a cell?",
            ["Protein synthesis", "Energy production", "DNA replication", "Waste removal"],
            1,
            "Mitochondria are known as the powerhouses of the cell because they produce ATP through cellular respiration.",
            "Cell Biology",
        ),
        question(
            2,
            "Which programming paradigm does Python primarily support?",
            ["Only object-oriented", "Only functional", "Multi-paradigm", "Only procedural"],
            2,
            "Python supports multiple programming paradigms including object-oriented, functional, and procedural programming.",
            "Programming Paradigms",
        ),
        question(
            3,
            "What is the time complexity of binary search?",
            ["O(n)", "O(log n)", "O(n²)", "O(1)"],
            1,
            "Binary search has O(log n) time complexity because it eliminates half of the remaining elements in each step.",
            "Algorithm Analysis",
        ),
    ]
}

/// The fixed three-question demo set.
pub fn question_set() -> QuestionSet {
    QuestionSet::from_checked(demo_questions(), DEMO_SUMMARY)
}

pub fn topics() -> Vec<String> {
    question_set().topics()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_questions_pass_set_checks() {
        let checked = QuestionSet::new(demo_questions(), DEMO_SUMMARY).unwrap();
        assert_eq!(checked, question_set());
    }

    #[test]
    fn test_demo_set_is_deterministic() {
        let set = question_set();
        assert_eq!(set.len(), 3);
        assert_eq!(set, question_set());
        assert_eq!(set.get(3).and_then(|q| q.correct_option()), Some("O(log n)"));
        assert_eq!(topics().len(), 3);
    }
}
