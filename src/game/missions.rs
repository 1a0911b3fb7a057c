//! Per-player missions.

use crate::error::{GameError, GameResult};

use super::state::{Mission, MissionState};

/// Title of the mission completed by the first daily claim.
pub const DAILY_LOGIN: &str = "Daily Login";

/// The mission every new account starts with.
pub fn daily_login_mission() -> Mission {
    Mission {
        id: "mission_1".to_string(),
        title: DAILY_LOGIN.to_string(),
        description: "Log in for 7 consecutive days".to_string(),
        reward: 500,
        unlock_level: 1,
        completed: false,
    }
}

/// Append a new open mission and return its id.
pub fn create(
    missions: &mut MissionState,
    title: &str,
    description: &str,
    reward: u64,
    unlock_level: u32,
) -> GameResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(GameError::InvalidProfile("mission title is empty".into()));
    }
    let id = format!("mission_{}", missions.missions.len() + 1);
    missions.missions.push(Mission {
        id: id.clone(),
        title: title.to_string(),
        description: description.to_string(),
        reward,
        unlock_level,
        completed: false,
    });
    Ok(id)
}

/// Missions visible at `level`.
pub fn available(missions: &MissionState, level: u32) -> Vec<&Mission> {
    missions
        .missions
        .iter()
        .filter(|m| m.unlock_level <= level)
        .collect()
}

/// Mark a mission complete by id. Returns `false` when it does not exist or
/// was already complete.
pub fn complete(missions: &mut MissionState, id: &str) -> bool {
    match missions.missions.iter_mut().find(|m| m.id == id) {
        Some(m) if !m.completed => {
            m.completed = true;
            true
        }
        _ => false,
    }
}

/// Mark the first open mission with `title` complete.
pub fn complete_by_title(missions: &mut MissionState, title: &str) -> bool {
    match missions
        .missions
        .iter_mut()
        .find(|m| m.title == title && !m.completed)
    {
        Some(m) => {
            m.completed = true;
            true
        }
        None => false,
    }
}
