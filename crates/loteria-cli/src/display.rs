//! Plain-text output for the `profiles` and `list` commands.

use loteria_core::GameProfile;

use crate::intake::{IntakeBuffer, IntakeError};

/// Print the profile catalog as an aligned table.
pub fn print_profiles(profiles: &[GameProfile]) {
    let width = profiles
        .iter()
        .map(|p| p.name.len())
        .max()
        .unwrap_or(0)
        .max("Profile".len());

    println!("{:<width$}  {:>8}  {:>9}", "Profile", "Numbers", "Per image");
    for p in profiles {
        println!(
            "{:<width$}  {:>8}  {:>9}",
            p.name, p.numbers_per_game, p.games_per_image
        );
    }
}

/// Print the accepted files, then any rejections.
pub fn print_intake(intake: &IntakeBuffer, rejected: &[IntakeError]) {
    println!("Files");
    for line in intake.listing() {
        println!("  {line}");
    }
    if !rejected.is_empty() {
        println!();
        println!("Rejected");
        for e in rejected {
            println!("  {e}");
        }
    }
}
