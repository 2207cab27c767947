use crate::SimRng;

/// Reshuffle-on-empty draw bag.
///
/// Weighted entries are expanded into copies, so an item with weight 3 comes out three times per
/// refill. Consecutive draws never return the same value unless the template holds a single
/// distinct value; this holds across the refill boundary too.
#[derive(Debug, Clone, PartialEq)]
pub struct ShuffleBag<T> {
    template: Vec<T>,
    current: Vec<T>,
    last: Option<T>,
}

impl<T: Clone + PartialEq> ShuffleBag<T> {
    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        let template: Vec<T> = items.into_iter().collect();
        Self {
            current: template.clone(),
            template,
            last: None,
        }
    }

    pub fn weighted(entries: impl IntoIterator<Item = (T, u32)>) -> Self {
        let mut template = Vec::new();
        for (item, weight) in entries {
            for _ in 0..weight {
                template.push(item.clone());
            }
        }
        Self::new(template)
    }

    pub fn template(&self) -> &[T] {
        &self.template
    }

    /// Items left before the next refill.
    pub fn remaining(&self) -> usize {
        self.current.len()
    }

    pub fn last(&self) -> Option<&T> {
        self.last.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.template.is_empty()
    }

    /// Draws the next item. Returns `None` only for an empty template.
    pub fn draw(&mut self, rng: &mut SimRng) -> Option<T> {
        if self.template.is_empty() {
            return None;
        }
        if self.current.is_empty() {
            self.current = self.template.clone();
        }

        if !self.has_alternative() {
            // Everything left repeats `last`: start the next round early so a different value
            // can be chosen, unless the template itself is a single value.
            self.current = self.template.clone();
            if !self.has_alternative() {
                let item = self.current.swap_remove(0);
                self.last = Some(item.clone());
                return Some(item);
            }
        }

        let candidates: Vec<usize> = (0..self.current.len())
            .filter(|&i| self.last.as_ref() != Some(&self.current[i]))
            .collect();
        let pick = candidates[rng.index(candidates.len())];
        // `remove` keeps the remaining order stable, so draw order depends only on the stream.
        let item = self.current.remove(pick);
        self.last = Some(item.clone());
        Some(item)
    }

    /// Forgets the last draw and restores the full template.
    pub fn reset(&mut self) {
        self.current = self.template.clone();
        self.last = None;
    }

    fn has_alternative(&self) -> bool {
        match &self.last {
            None => !self.current.is_empty(),
            Some(last) => self.current.iter().any(|item| item != last),
        }
    }
}
