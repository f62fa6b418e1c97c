// Copyright (c) 2022 Frank Fischer <frank-fischer@shadow-soft.de>
//
// This program is free software: you can redistribute it and/or
// modify it under the terms of the GNU General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
// General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see  <http://www.gnu.org/licenses/>
//

//! Dispatching of user commands.
//!
//! # Example
//!
//! ```
//! use flowscope::config::{ModelConfig, PlaybackConfig};
//! use flowscope::controller::{Command, Controller};
//! use flowscope::graph::BasicEdge;
//! use flowscope::playback::PlaybackEvent;
//!
//! let mut controller = Controller::<u64>::new(ModelConfig::default(), PlaybackConfig::default()).unwrap();
//! controller.handle(Command::AddEdge(BasicEdge { u: 0, to: 1, delta: 5 })).unwrap();
//! controller.handle(Command::Run).unwrap();
//! controller.handle(Command::Skip).unwrap();
//!
//! let mut last = None;
//! while let Some(event) = controller.tick() {
//!     last = Some(event);
//! }
//! assert_eq!(last, Some(PlaybackEvent::Unlock));
//! assert_eq!(controller.current_frame().map(|f| f.pushed_flow), Some(5));
//! ```

use crate::config::{ModelConfig, PlaybackConfig};
use crate::error::Result;
use crate::graph::BasicEdge;
use crate::layout::Point;
use crate::model::MaxFlowModel;
use crate::num::traits::{NumAssign, PrimInt, Unsigned};
use crate::observer::{Observer, SubscriberId};
use crate::playback::{Frame, FrameQueue, PlaybackEvent};

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};
use tracing::debug;

use std::cell::RefCell;
use std::rc::Rc;

/// A user command.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Command<F> {
    ChangeVerticesNumber(usize),
    AddEdge(BasicEdge<F>),
    DeleteEdge { u: usize, to: usize },
    Run,
    GenRandomSample,
    /// Undo the latest change.
    Cancel,
    /// Jump to the end of the animation.
    Skip,
    MousePressed(Point),
    MouseMoved(Point),
    MouseReleased(Point),
    /// Select the arc animation speed by slider level.
    ChangeSpeed(usize),
    /// Select the vertex animation speed by slider level.
    ChangeLatency(usize),
}

impl<F> Command<F> {
    /// Return the name of the command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::ChangeVerticesNumber(_) => "change-vertices-number",
            Command::AddEdge(_) => "add-edge",
            Command::DeleteEdge { .. } => "delete-edge",
            Command::Run => "run",
            Command::GenRandomSample => "gen-random-sample",
            Command::Cancel => "cancel",
            Command::Skip => "skip",
            Command::MousePressed(_) => "mouse-pressed",
            Command::MouseMoved(_) => "mouse-moved",
            Command::MouseReleased(_) => "mouse-released",
            Command::ChangeSpeed(_) => "change-speed",
            Command::ChangeLatency(_) => "change-latency",
        }
    }
}

/// Connects the model with the frame queue.
pub struct Controller<F> {
    model: MaxFlowModel<F>,
    queue: Rc<RefCell<FrameQueue<F>>>,
}

impl<F> Controller<F>
where
    F: PrimInt + Unsigned + NumAssign + 'static,
{
    pub fn new(model_config: ModelConfig, playback_config: PlaybackConfig) -> Result<Self> {
        let mut model = MaxFlowModel::new(model_config);
        let queue = Rc::new(RefCell::new(FrameQueue::new(playback_config)));
        model.subscribe(&queue)?;
        Ok(Controller { model, queue })
    }

    pub fn model(&self) -> &MaxFlowModel<F> {
        &self.model
    }

    pub fn frame_queue(&self) -> &Rc<RefCell<FrameQueue<F>>> {
        &self.queue
    }

    /// Execute a command.
    ///
    /// A rejected command does not change anything.
    pub fn handle(&mut self, cmd: Command<F>) -> Result<()> {
        debug!(command = cmd.name(), "handle");
        match cmd {
            Command::ChangeVerticesNumber(n) => self.model.change_vertices_number(n),
            Command::AddEdge(edge) => self.model.add_edge(edge),
            Command::DeleteEdge { u, to } => self.model.delete_edge(u, to),
            Command::Run => self.model.run().map(|_| ()),
            Command::GenRandomSample => self.model.gen_random_sample(),
            Command::Cancel => self.model.recover_prev_state(),
            Command::Skip => self.queue.borrow_mut().skip(),
            Command::MousePressed(p) => {
                self.queue.borrow_mut().mouse_pressed(p);
                Ok(())
            }
            Command::MouseMoved(p) => {
                self.queue.borrow_mut().mouse_moved(p);
                Ok(())
            }
            Command::MouseReleased(p) => {
                self.queue.borrow_mut().mouse_released(p);
                Ok(())
            }
            Command::ChangeSpeed(level) => self.queue.borrow_mut().change_speed(level),
            Command::ChangeLatency(level) => self.queue.borrow_mut().change_latency(level),
        }
    }

    /// Publish the next frame, see [`FrameQueue::tick`].
    pub fn tick(&mut self) -> Option<PlaybackEvent<F>> {
        self.queue.borrow_mut().tick()
    }

    /// Return a copy of the frame published last.
    pub fn current_frame(&self) -> Option<Frame<F>> {
        self.queue.borrow().current_frame().cloned()
    }

    pub fn subscribe_drawer<O>(&mut self, drawer: &Rc<RefCell<O>>) -> Result<SubscriberId>
    where
        O: Observer<PlaybackEvent<F>> + 'static,
    {
        self.queue.borrow_mut().subscribe(drawer)
    }

    pub fn unsubscribe_drawer(&mut self, id: SubscriberId) -> bool {
        self.queue.borrow_mut().unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::{Command, Controller};
    use crate::config::{ModelConfig, PlaybackConfig};
    use crate::error::Error;
    use crate::graph::{BasicEdge, Status};
    use crate::layout::Point;
    use crate::playback::PlaybackEvent;

    fn controller() -> Controller<u64> {
        Controller::new(ModelConfig::default(), PlaybackConfig::default()).unwrap()
    }

    fn add(u: usize, to: usize, delta: u64) -> Command<u64> {
        Command::AddEdge(BasicEdge { u, to, delta })
    }

    fn drain(controller: &mut Controller<u64>) -> Vec<PlaybackEvent<u64>> {
        std::iter::from_fn(|| controller.tick()).collect()
    }

    #[test]
    fn test_initial_frame() {
        let mut controller = controller();
        assert_eq!(controller.frame_queue().borrow().len(), 1);
        let events = drain(&mut controller);
        assert_eq!(events.len(), 1);
        assert_eq!(controller.current_frame().map(|f| f.vertices.len()), Some(2));
    }

    #[test]
    fn test_run_and_skip() {
        let mut controller = controller();
        for cmd in vec![
            Command::ChangeVerticesNumber(4),
            add(0, 1, 1),
            add(0, 2, 2),
            add(2, 1, 1),
            add(1, 3, 2),
            add(2, 3, 1),
            Command::Run,
        ] {
            controller.handle(cmd).unwrap();
        }
        assert_eq!(controller.model().pushed_flow(), 3);

        // play a few steps of the animation
        for _ in 0..100 {
            controller.tick();
        }
        let frame = controller.current_frame().unwrap();
        assert_eq!(frame.vertices[0], Status::OnTheNetwork);

        controller.handle(Command::Skip).unwrap();
        let events = drain(&mut controller);
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], PlaybackEvent::Unlock);
        let frame = controller.current_frame().unwrap();
        assert_eq!(frame.pushed_flow, 3);
        assert!(frame.vertices.iter().all(|&s| s == Status::Basic));

        assert_eq!(controller.handle(Command::Skip), Err(Error::NothingToSkip));
    }

    #[test]
    fn test_cancel() {
        let mut controller = controller();
        assert_eq!(controller.handle(Command::Cancel), Err(Error::EmptyHistory));
        controller.handle(add(0, 1, 7)).unwrap();
        controller.handle(Command::Run).unwrap();
        controller.handle(Command::Cancel).unwrap();
        assert_eq!(controller.model().pushed_flow(), 0);
        assert_eq!(controller.model().graph().arc(0).capacity, 7);

        let events = drain(&mut controller);
        assert_eq!(events.iter().filter(|e| **e == PlaybackEvent::Unlock).count(), 1);
        let frame = controller.current_frame().unwrap();
        assert_eq!(frame.edges[0].capacity, 7);
        assert_eq!(frame.pushed_flow, 0);
    }

    #[test]
    fn test_rejected() {
        let mut controller = controller();
        drain(&mut controller);
        assert_eq!(controller.handle(add(0, 0, 1)), Err(Error::SelfLoop { vertex: 0 }));
        assert_eq!(
            controller.handle(Command::ChangeSpeed(20)),
            Err(Error::InvalidLevel { level: 20, levels: 11 })
        );
        assert!(controller.frame_queue().borrow().is_empty());
        assert_eq!(controller.model().history_len(), 0);
    }

    #[test]
    fn test_drag() {
        let mut controller = controller();
        drain(&mut controller);
        controller.handle(Command::MousePressed(Point::new(0.5, 5.0))).unwrap();
        controller.handle(Command::MouseMoved(Point::new(2.0, 2.0))).unwrap();
        controller.handle(Command::MouseReleased(Point::new(2.0, 2.0))).unwrap();
        let events = drain(&mut controller);
        assert_eq!(events.len(), 2);
        let frame = controller.current_frame().unwrap();
        assert_eq!(frame.pos[0], Point::new(2.0, 2.0));
        assert_eq!(frame.selected_vertex, None);
    }

    #[test]
    fn test_command_names() {
        assert_eq!(Command::<u64>::Run.name(), "run");
        assert_eq!(add(0, 1, 1).name(), "add-edge");
        assert_eq!(Command::<u64>::DeleteEdge { u: 0, to: 1 }.name(), "delete-edge");
    }
}
