//! # Scene Management System
//!
//! Drives the progression controller from the macroquad frame loop and shows
//! the ending screen once a run is over.

use crate::{
    InputHandler, KeyValueStore, MacroquadDisplay, PandoraResult, ProgressionController,
    RunOutcome, StepStatus,
};
use log::info;
use macroquad::prelude::*;
use std::time::Duration;

/// Represents the current scene in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneType {
    /// A run in progress
    Playing,
    /// Ending screen (victory, defeat or quit)
    GameOver(RunOutcome),
}

/// The main scene manager that coordinates all game scenes
pub struct SceneManager<S: KeyValueStore> {
    current_scene: SceneType,
    controller: ProgressionController<MacroquadDisplay, InputHandler, S>,
}

impl<S: KeyValueStore> SceneManager<S> {
    pub fn new(controller: ProgressionController<MacroquadDisplay, InputHandler, S>) -> Self {
        Self {
            current_scene: SceneType::Playing,
            controller,
        }
    }

    pub fn current_scene(&self) -> SceneType {
        self.current_scene
    }

    /// Runs the main scene loop until the game exits
    pub async fn run(&mut self) -> PandoraResult<()> {
        loop {
            let exit = match self.current_scene {
                SceneType::Playing => self.update_playing_scene()?,
                SceneType::GameOver(outcome) => self.update_game_over_scene(outcome)?,
            };
            if exit {
                break;
            }
            next_frame().await;
        }
        info!("Scene loop ended");
        Ok(())
    }

    /// Steps the controller for one frame and draws it
    fn update_playing_scene(&mut self) -> PandoraResult<bool> {
        let dt = get_frame_time();
        self.controller.display_mut().update(dt);

        if let StepStatus::Finished(outcome) =
            self.controller.step(Duration::from_secs_f32(dt))?
        {
            info!("Run finished: {:?}", outcome);
            self.controller.display_mut().show_ending(outcome);
            self.current_scene = SceneType::GameOver(outcome);
        }

        self.controller.display().render();
        Ok(false)
    }

    /// Updates the ending screen, returns true if exit is requested
    fn update_game_over_scene(&mut self, outcome: RunOutcome) -> PandoraResult<bool> {
        self.controller.display().render();

        if is_key_pressed(KeyCode::N) {
            self.start_over(true)?;
        } else if is_key_pressed(KeyCode::C) && outcome != RunOutcome::Victory {
            // Continue from the last checkpoint
            self.start_over(false)?;
        } else if is_key_pressed(KeyCode::Escape) {
            return Ok(true);
        }

        Ok(false)
    }

    fn start_over(&mut self, erase_saved_data: bool) -> PandoraResult<()> {
        self.controller.restart(erase_saved_data)?;
        self.controller.display_mut().reset();
        self.current_scene = SceneType::Playing;
        Ok(())
    }
}
