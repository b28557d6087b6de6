/*!
 * Tests for token-budgeted context selection
 */

use std::sync::Arc;

use glossgen::glossary::context::CONTEXT_TOKEN_BUDGET;
use glossgen::glossary::{CharTokenizer, ContextSelector, EntityType, Term, TiktokenTokenizer, Tokenizer};

fn story(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("アリスは{}番目の部屋で{}を見つけた", i, "本".repeat(i % 40)))
        .collect()
}

#[test]
fn test_assign_contexts_shouldStayWithinBudgetUnlessSingleLine() {
    let tokenizer: Arc<dyn Tokenizer> = Arc::new(CharTokenizer);
    let mut selector = ContextSelector::with_budget(tokenizer.clone(), 120);
    let lines = story(200);
    let mut terms = vec![
        Term::new("アリス", EntityType::Person, 0, 0.9),
        Term::new("部屋", EntityType::Location, 0, 0.9),
    ];

    selector.assign_contexts(&mut terms, &lines);

    for term in &terms {
        assert!(!term.context.is_empty());
        let total: usize = term.context.iter().map(|l| tokenizer.count_tokens(l)).sum();
        assert!(total <= 120 || term.context.len() == 1);
    }
}

#[test]
fn test_assign_contexts_shouldBeDeterministic() {
    let lines = story(50);
    let mut first = vec![Term::new("アリス", EntityType::Person, 0, 0.9)];
    let mut second = first.clone();

    ContextSelector::with_budget(Arc::new(CharTokenizer), 64).assign_contexts(&mut first, &lines);
    ContextSelector::with_budget(Arc::new(CharTokenizer), 64).assign_contexts(&mut second, &lines);
    assert_eq!(first[0].context, second[0].context);
}

#[test]
fn test_tiktoken_selection_shouldRespectDefaultBudget() {
    let tokenizer: Arc<dyn Tokenizer> = Arc::new(TiktokenTokenizer::new().unwrap());
    let mut selector = ContextSelector::new(tokenizer.clone());
    assert_eq!(selector.budget(), CONTEXT_TOKEN_BUDGET);

    let lines = story(300);
    let context = selector.search_context("アリス", &["アリス"], &lines);
    let total: usize = context.iter().map(|l| tokenizer.count_tokens(l)).sum();
    assert!(!context.is_empty());
    assert!(total <= CONTEXT_TOKEN_BUDGET);
}
