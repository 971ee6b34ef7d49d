use crate::domain::model::{
    AssetJob, JobCatalog, CATEGORY_CHARACTERS, CATEGORY_EFFECTS, CATEGORY_UI_ELEMENTS,
    CATEGORY_WEAPONS,
};

/// 內建素材清單
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum CatalogPreset {
    /// Every character, weapon, effect and UI asset of the game
    #[default]
    Full,
    /// Three flying-sword variants on plain backgrounds
    TransparentSwords,
}

impl CatalogPreset {
    pub fn build(self) -> JobCatalog {
        let entries: &[(&str, &str, &str)] = match self {
            Self::Full => FULL_CATALOG,
            Self::TransparentSwords => TRANSPARENT_SWORDS,
        };

        entries
            .iter()
            .map(|(category, name, prompt)| {
                AssetJob::new(*category, *name, *prompt, format!("{}.png", name))
            })
            .collect()
    }
}

const FULL_CATALOG: &[(&str, &str, &str)] = &[
    (
        CATEGORY_CHARACTERS,
        "player_character",
        "mystical warrior cultivator, ancient chinese robes, floating meditation pose, ethereal aura, controlling flying swords, 2D game character sprite, clean white background, isolated, PNG format, game asset",
    ),
    (
        CATEGORY_CHARACTERS,
        "basic_ghost",
        "chinese ghost spirit, translucent white appearance, glowing red eyes, tattered traditional robes, menacing floating pose, 2D game enemy sprite, white background, isolated character, PNG format",
    ),
    (
        CATEGORY_CHARACTERS,
        "strong_ghost",
        "powerful ghost demon, dark smoky aura, fierce red glowing eyes, larger intimidating size, torn black robes, boss enemy sprite, white background, isolated, PNG format, 2D game asset",
    ),
    (
        CATEGORY_WEAPONS,
        "flying_sword",
        "elegant chinese flying sword, mystical silver blade, ornate golden hilt with jade details, floating horizontally, clean white background, isolated weapon, PNG format, 2D game sprite",
    ),
    (
        CATEGORY_WEAPONS,
        "sword_energy",
        "sword energy aura, blue mystical energy surrounding blade, glowing effect, transparent energy wisps, white background, isolated effect, PNG format, game weapon enhancement",
    ),
    (
        CATEGORY_EFFECTS,
        "sword_trail",
        "sword afterimage trail, blue energy motion blur, fading opacity effect, mystical sword path, white background, isolated effect, PNG format, 2D game trail effect",
    ),
    (
        CATEGORY_EFFECTS,
        "hit_effect",
        "sword strike impact sparks, golden energy burst, hit collision effect, impact particles, white background, isolated effect, PNG format, 2D game impact animation",
    ),
    (
        CATEGORY_EFFECTS,
        "enemy_death",
        "ghost dissipation effect, white smoke particles, spirit fading away, death animation effect, white background, isolated effect, PNG format, enemy destruction effect",
    ),
    (
        CATEGORY_UI_ELEMENTS,
        "health_bar_frame",
        "ancient chinese health bar frame, wooden texture with gold inlay, jade corner decorations, traditional border design, white background, isolated UI element, PNG format",
    ),
    (
        CATEGORY_UI_ELEMENTS,
        "score_panel",
        "traditional chinese scroll panel, aged parchment texture, gold decorative borders, corner tassels, score display background, white background, isolated UI, PNG format",
    ),
    (
        CATEGORY_UI_ELEMENTS,
        "sword_icon",
        "small sword status icon, minimalist chinese sword symbol, golden color, simple design for UI, white background, isolated icon, PNG format, 64x64 size",
    ),
];

const TRANSPARENT_SWORDS: &[(&str, &str, &str)] = &[
    (
        CATEGORY_WEAPONS,
        "flying_sword_transparent_v1",
        "ancient chinese flying sword, mystical golden blade, ornate handle with jade, floating in air, transparent background, no background, cutout style, PNG format, isolated object, game asset, side view, detailed metalwork",
    ),
    (
        CATEGORY_WEAPONS,
        "flying_sword_transparent_v2",
        "elegant chinese dao sword, silver blade with blue energy aura, traditional handle, levitating, transparent background, white background, isolated, PNG style, game weapon sprite, horizontal orientation",
    ),
    (
        CATEGORY_WEAPONS,
        "flying_sword_transparent_v3",
        "mystical jian sword, celestial blue blade, golden hilt with dragon motif, floating weapon, clean white background, cutout, PNG format, 2D game asset, profile view, no shadows",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::STANDARD_CATEGORIES;

    #[test]
    fn test_full_catalog_shape() {
        let catalog = CatalogPreset::Full.build();

        assert_eq!(catalog.len(), 11);
        assert_eq!(
            catalog.categories().collect::<Vec<_>>(),
            STANDARD_CATEGORIES.to_vec()
        );

        let first = catalog.jobs().next().unwrap();
        assert_eq!(first.name, "player_character");
        assert_eq!(first.filename, "player_character.png");
    }

    #[test]
    fn test_transparent_swords_are_weapons() {
        let catalog = CatalogPreset::TransparentSwords.build();

        assert_eq!(catalog.len(), 3);
        assert!(catalog.jobs().all(|job| job.category == CATEGORY_WEAPONS));
    }
}
