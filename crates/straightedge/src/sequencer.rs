//! Step-by-step reveal of a construction.
//!
//! A [`Sequencer`] walks a snapshot of the model's elements in construction
//! order. Its whole visual state is a function of the current index:
//!
//! ```text
//! position <  current   Shown
//! position == current   Shown + Selected + Annotated + FooterShown
//! position >  current   Hidden
//! ```
//!
//! Before the first step nothing is shown. Navigation never fails: stepping
//! past either end leaves the state unchanged.
//!
//! Each transition produces a [`Frame`], which is handed to an optional
//! [`Presenter`] for drawing.

use std::fmt;

use indexmap::IndexMap;
use log::{debug, trace};

use crate::{
    error::ConstructionError,
    store::{ElementRef, ElementStore},
};

/// How far an element is revealed. Each level includes the ones before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Reveal {
    Hidden,
    Shown,
    Selected,
    Annotated,
    FooterShown,
}

impl Reveal {
    /// Reveal level of the element at `position` while `current` is the step.
    pub fn at(position: usize, current: Option<usize>) -> Self {
        match current {
            Some(current) if position < current => Reveal::Shown,
            Some(current) if position == current => Reveal::FooterShown,
            _ => Reveal::Hidden,
        }
    }
}

/// Independent display layers of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Overlay {
    pub main: bool,
    pub selected: bool,
    pub annotated: bool,
    pub footer: bool,
}

impl From<Reveal> for Overlay {
    fn from(reveal: Reveal) -> Self {
        Self {
            main: reveal >= Reveal::Shown,
            selected: reveal >= Reveal::Selected,
            annotated: reveal >= Reveal::Annotated,
            footer: reveal >= Reveal::FooterShown,
        }
    }
}

/// The display state of every element at one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    current: Option<usize>,
    overlays: IndexMap<ElementRef, Overlay>,
}

impl Frame {
    fn new(elements: &[ElementRef], current: Option<usize>) -> Self {
        let overlays = elements
            .iter()
            .enumerate()
            .map(|(position, &element)| (element, Reveal::at(position, current).into()))
            .collect();
        Self { current, overlays }
    }

    /// The current step, or `None` before the first one.
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// The element at the current step.
    pub fn current_element(&self) -> Option<ElementRef> {
        self.current
            .and_then(|index| self.overlays.get_index(index))
            .map(|(&element, _)| element)
    }

    pub fn overlay(&self, element: ElementRef) -> Option<Overlay> {
        self.overlays.get(&element).copied()
    }

    /// Overlays in construction order.
    pub fn iter(&self) -> impl Iterator<Item = (ElementRef, Overlay)> + '_ {
        self.overlays.iter().map(|(&element, &overlay)| (element, overlay))
    }

    /// Elements with their main layer visible.
    pub fn visible(&self) -> impl Iterator<Item = ElementRef> + '_ {
        self.iter()
            .filter(|(_, overlay)| overlay.main)
            .map(|(element, _)| element)
    }
}

/// Draws frames.
pub trait Presenter {
    fn present(&mut self, frame: &Frame);
}

/// Step-by-step navigation over a fixed list of elements.
pub struct Sequencer {
    elements: Vec<ElementRef>,
    current: Option<usize>,
    presenter: Option<Box<dyn Presenter>>,
}

impl fmt::Debug for Sequencer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequencer")
            .field("elements", &self.elements)
            .field("current", &self.current)
            .field("presenter", &self.presenter.is_some())
            .finish()
    }
}

impl Sequencer {
    /// Snapshots the store's elements in construction order, all hidden.
    ///
    /// Later changes to the store are not seen by this sequencer.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::EmptySequence`] for an empty store.
    pub fn attach(store: &ElementStore) -> Result<Self, ConstructionError> {
        Self::from_elements(store.refs().collect())
    }

    /// # Errors
    ///
    /// Returns [`ConstructionError::EmptySequence`] for no elements.
    pub fn from_elements(elements: Vec<ElementRef>) -> Result<Self, ConstructionError> {
        if elements.is_empty() {
            return Err(ConstructionError::EmptySequence);
        }
        debug!(steps = elements.len(); "Attached sequencer");
        Ok(Self {
            elements,
            current: None,
            presenter: None,
        })
    }

    /// Sends every transition's frame to `presenter`.
    pub fn with_presenter(mut self, presenter: impl Presenter + 'static) -> Self {
        self.presenter = Some(Box::new(presenter));
        self
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Always `false`: empty sequences cannot be attached.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[ElementRef] {
        &self.elements
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    fn last(&self) -> usize {
        self.elements.len() - 1
    }

    /// The frame for the current state.
    pub fn frame(&self) -> Frame {
        Frame::new(&self.elements, self.current)
    }

    /// The frame a given step would show, without moving there.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::StepOutOfRange`] past the last step.
    pub fn frame_at(&self, index: usize) -> Result<Frame, ConstructionError> {
        self.check(index)?;
        Ok(Frame::new(&self.elements, Some(index)))
    }

    /// Frames for every step, first to last.
    pub fn frames(&self) -> impl Iterator<Item = Frame> + '_ {
        (0..self.elements.len()).map(|index| Frame::new(&self.elements, Some(index)))
    }

    fn check(&self, index: usize) -> Result<(), ConstructionError> {
        if index < self.elements.len() {
            Ok(())
        } else {
            Err(ConstructionError::StepOutOfRange {
                index,
                len: self.elements.len(),
            })
        }
    }

    fn transition(&mut self, current: Option<usize>) -> Frame {
        self.current = current;
        let frame = self.frame();
        trace!(current:? = current; "Sequencer transition");
        if let Some(presenter) = self.presenter.as_mut() {
            presenter.present(&frame);
        }
        frame
    }

    /// Moves to the first step.
    pub fn goto_start(&mut self) -> Frame {
        self.transition(Some(0))
    }

    /// Moves to the last step.
    pub fn goto_end(&mut self) -> Frame {
        self.transition(Some(self.last()))
    }

    /// Moves to a specific step.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::StepOutOfRange`] past the last step.
    pub fn goto_index(&mut self, index: usize) -> Result<Frame, ConstructionError> {
        self.check(index)?;
        Ok(self.transition(Some(index)))
    }

    /// Moves one step forward. From before the first step this shows the
    /// first step; at the last step nothing changes.
    pub fn step_forward(&mut self) -> Frame {
        match self.current {
            None => self.transition(Some(0)),
            Some(index) if index < self.last() => self.transition(Some(index + 1)),
            Some(_) => self.frame(),
        }
    }

    /// Moves one step back. At the first step, or before it, nothing changes.
    pub fn step_back(&mut self) -> Frame {
        match self.current {
            Some(index) if index > 0 => self.transition(Some(index - 1)),
            _ => self.frame(),
        }
    }

    /// Hides everything and then plays every step in order, as an animation
    /// would. Returns the number of frames presented.
    pub fn replay(&mut self) -> usize {
        self.transition(None);
        for index in 0..self.elements.len() {
            self.transition(Some(index));
        }
        self.elements.len() + 1
    }
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use straightedge_core::{element::Element, geometry::Point};

    use super::*;

    // ===================
    // Strategies
    // ===================

    #[derive(Debug, Clone, Copy)]
    enum Nav {
        Start,
        End,
        Forward,
        Back,
    }

    fn nav_strategy() -> impl Strategy<Value = Nav> {
        prop_oneof![
            Just(Nav::Start),
            Just(Nav::End),
            Just(Nav::Forward),
            Just(Nav::Back),
        ]
    }

    fn attach(count: usize) -> (ElementStore, Sequencer) {
        let mut store = ElementStore::default();
        for x in 0..count {
            let point = Point::new(i64::try_from(x).unwrap(), 0);
            store.insert(Element::Point(point), [], [""; 0]).unwrap();
        }
        let sequencer = Sequencer::attach(&store).unwrap();
        (store, sequencer)
    }

    // ===================
    // Property Test Functions
    // ===================

    /// After any navigation the frame equals a direct jump to the same index.
    fn check_state_depends_only_on_index(count: usize, moves: Vec<Nav>) -> Result<(), TestCaseError> {
        let (_store, mut sequencer) = attach(count);
        for step in moves {
            let frame = match step {
                Nav::Start => sequencer.goto_start(),
                Nav::End => sequencer.goto_end(),
                Nav::Forward => sequencer.step_forward(),
                Nav::Back => sequencer.step_back(),
            };
            prop_assert_eq!(frame.current(), sequencer.current_index());
            if let Some(index) = sequencer.current_index() {
                prop_assert!(index < count);
                prop_assert_eq!(&frame, &sequencer.frame_at(index).unwrap());
                prop_assert_eq!(frame.visible().count(), index + 1);
            }
        }
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn state_depends_only_on_index(
            count in 1usize..8,
            moves in prop::collection::vec(nav_strategy(), 0..24),
        ) {
            check_state_depends_only_on_index(count, moves)?;
        }
    }
}
