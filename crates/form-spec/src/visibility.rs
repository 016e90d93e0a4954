use std::collections::BTreeMap;

use crate::answers::AnswerMap;
use crate::rule::should_show;
use crate::spec::form::FormSpec;

pub type VisibilityMap = BTreeMap<String, bool>;

/// One evaluation pass over every question of the form.
///
/// Questions sharing a key collapse into one entry; the later question wins.
pub fn resolve_visibility(spec: &FormSpec, answers: &AnswerMap) -> VisibilityMap {
    let mut map = VisibilityMap::new();
    for question in &spec.questions {
        let visible = should_show(question.conditional_rules.as_ref(), answers);
        map.insert(question.question_key.clone(), visible);
    }
    map
}

/// Visibility of each question in form order, duplicates included.
pub fn visible_in_order(spec: &FormSpec, answers: &AnswerMap) -> Vec<bool> {
    spec.questions
        .iter()
        .map(|question| should_show(question.conditional_rules.as_ref(), answers))
        .collect()
}
