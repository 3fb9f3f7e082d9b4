//! Lottery game profiles and the prompt templates sent to the vision model.
//!
//! A profile is a named lottery format ("LotoFacil", "MegaSena", ...). Its
//! template is rendered against the number of images in a processing cycle:
//! the rendered prompt tells the model how many games to expect, the exact
//! JSON shape to answer with, and which games belong to which image.

/// Placeholders substituted by [`GameProfile::render_prompt`].
const IMAGE_COUNT: &str = "{image_count}";
const TOTAL_GAMES: &str = "{total_games}";
const NUMBERS_PER_GAME: &str = "{numbers_per_game}";
const IMAGE_MAP: &str = "{image_map}";

// ── Prompt templates ──

const LOTOFACIL_TEMPLATE: &str = "\
Você receberá {image_count} imagem(ns) de volantes da Lotofácil.
Cada imagem contém até 3 jogos, com {numbers_per_game} números marcados por jogo, entre 1 e 25.
Ao todo são esperados {total_games} jogos.

Os jogos estão distribuídos pelas imagens nesta ordem:
{image_map}

Responda SOMENTE com um objeto JSON, sem explicações.
As chaves devem ser \"game1\", \"game2\", ... em ordem crescente, seguindo a distribuição acima.
Cada valor deve ser um array com os {numbers_per_game} números inteiros do jogo, em ordem crescente.
Exemplo: {\"game1\": [1, 2, 3, ...], \"game2\": [4, 5, 6, ...]}";

const MEGASENA_TEMPLATE: &str = "\
Você receberá {image_count} imagem(ns) de volantes da Mega-Sena.
Cada imagem contém até 2 jogos, com {numbers_per_game} números marcados por jogo, entre 1 e 60.
Ao todo são esperados {total_games} jogos.

Os jogos estão distribuídos pelas imagens nesta ordem:
{image_map}

Responda SOMENTE com um objeto JSON, sem explicações.
As chaves devem ser \"game1\", \"game2\", ... em ordem crescente, seguindo a distribuição acima.
Cada valor deve ser um array com os {numbers_per_game} números inteiros do jogo, em ordem crescente.
Exemplo: {\"game1\": [5, 12, 23, 34, 45, 56]}";

const QUINA_TEMPLATE: &str = "\
Você receberá {image_count} imagem(ns) de volantes da Quina.
Cada imagem contém até 3 jogos, com {numbers_per_game} números marcados por jogo, entre 1 e 80.
Ao todo são esperados {total_games} jogos.

Os jogos estão distribuídos pelas imagens nesta ordem:
{image_map}

Responda SOMENTE com um objeto JSON, sem explicações.
As chaves devem ser \"game1\", \"game2\", ... em ordem crescente, seguindo a distribuição acima.
Cada valor deve ser um array com os {numbers_per_game} números inteiros do jogo, em ordem crescente.
Exemplo: {\"game1\": [7, 19, 33, 48, 71]}";

/// A named lottery format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameProfile {
    pub name: &'static str,
    pub numbers_per_game: usize,
    /// Games printed on a single ticket photograph.
    pub games_per_image: usize,
    template: &'static str,
}

/// Fixed catalog, in display order.
pub const CATALOG: &[GameProfile] = &[
    GameProfile {
        name: "LotoFacil",
        numbers_per_game: 15,
        games_per_image: 3,
        template: LOTOFACIL_TEMPLATE,
    },
    GameProfile {
        name: "MegaSena",
        numbers_per_game: 6,
        games_per_image: 2,
        template: MEGASENA_TEMPLATE,
    },
    GameProfile {
        name: "Quina",
        numbers_per_game: 5,
        games_per_image: 3,
        template: QUINA_TEMPLATE,
    },
];

impl GameProfile {
    /// All known profiles.
    pub fn catalog() -> &'static [GameProfile] {
        CATALOG
    }

    /// Look up a profile by name, ignoring ASCII case.
    pub fn find(name: &str) -> Option<&'static GameProfile> {
        CATALOG.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Comma-separated profile names, for error messages and help text.
    pub fn names() -> String {
        CATALOG
            .iter()
            .map(|p| p.name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Total games expected for `image_count` images.
    pub fn expected_games(&self, image_count: usize) -> usize {
        image_count * self.games_per_image
    }

    /// Render the instruction text for a cycle with `image_count` images.
    pub fn render_prompt(&self, image_count: usize) -> String {
        self.template
            .replace(IMAGE_COUNT, &image_count.to_string())
            .replace(TOTAL_GAMES, &self.expected_games(image_count).to_string())
            .replace(NUMBERS_PER_GAME, &self.numbers_per_game.to_string())
            .replace(IMAGE_MAP, &self.image_map(image_count))
    }

    /// One line per image naming the game range it holds, e.g.
    /// `- imagem 2 → jogos 4 a 6`. Positional: image order matters.
    fn image_map(&self, image_count: usize) -> String {
        (0..image_count)
            .map(|i| {
                let first = i * self.games_per_image + 1;
                let last = first + self.games_per_image - 1;
                if first == last {
                    format!("- imagem {} → jogo {first}", i + 1)
                } else {
                    format!("- imagem {} → jogos {first} a {last}", i + 1)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_is_case_insensitive() {
        assert_eq!(GameProfile::find("lotofacil").unwrap().numbers_per_game, 15);
        assert_eq!(GameProfile::find("MEGASENA").unwrap().numbers_per_game, 6);
        assert!(GameProfile::find("powerball").is_none());
    }

    #[test]
    fn names_lists_catalog_in_order() {
        assert_eq!(GameProfile::names(), "LotoFacil, MegaSena, Quina");
    }

    #[test]
    fn prompt_substitutes_counts() {
        let profile = GameProfile::find("LotoFacil").unwrap();
        let prompt = profile.render_prompt(2);

        assert!(prompt.contains("Você receberá 2 imagem(ns)"));
        assert!(prompt.contains("são esperados 6 jogos"));
        assert!(prompt.contains("15 números"));
        assert!(prompt.contains("\"game1\""));
        assert!(!prompt.contains("{image_count}"));
        assert!(!prompt.contains("{total_games}"));
        assert!(!prompt.contains("{image_map}"));
    }

    #[test]
    fn prompt_maps_images_to_game_ranges() {
        let profile = GameProfile::find("LotoFacil").unwrap();
        let prompt = profile.render_prompt(3);

        assert!(prompt.contains("- imagem 1 → jogos 1 a 3"));
        assert!(prompt.contains("- imagem 2 → jogos 4 a 6"));
        assert!(prompt.contains("- imagem 3 → jogos 7 a 9"));
        assert!(!prompt.contains("imagem 4"));
    }

    #[test]
    fn megasena_maps_two_games_per_image() {
        let profile = GameProfile::find("MegaSena").unwrap();
        let prompt = profile.render_prompt(2);

        assert!(prompt.contains("- imagem 1 → jogos 1 a 2"));
        assert!(prompt.contains("- imagem 2 → jogos 3 a 4"));
        assert_eq!(profile.expected_games(2), 4);
    }
}
