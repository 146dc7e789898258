//! ASCII rendering of the current board in level-text notation.

use scale_sokoban_core::{CellCoord, ElementKind, ElementView, Symbol};
use scale_sokoban_world::Level;

/// Renders the board using the glyphs the level parser understands.
///
/// Element anchors take precedence over tiles; the remaining cells of a big
/// footprint show the tile beneath. Every wall cell renders as a 1×1 wall.
pub(crate) fn render_board(level: &Level, elements: &ElementView) -> String {
    let columns = level.columns();
    if columns == 0 {
        return String::new();
    }
    let mut symbols = vec![Symbol::Ground; (columns * level.rows()) as usize];
    let index = |cell: CellCoord| (cell.row() * columns + cell.column()) as usize;

    for row in 0..level.rows() {
        for column in 0..columns {
            let cell = CellCoord::new(column, row);
            if level.is_wall(cell) {
                symbols[index(cell)] = Symbol::Wall1x1;
            }
        }
    }
    for cell in level.grow_cells() {
        symbols[index(*cell)] = Symbol::Grow;
    }
    for cell in level.shrink_cells() {
        symbols[index(*cell)] = Symbol::Shrink;
    }
    for target in level.targets() {
        symbols[index(target.cell())] = if target.big() {
            Symbol::TargetBig
        } else {
            Symbol::TargetSmall
        };
    }
    for element in elements.iter() {
        if !level.contains(element.anchor) {
            continue;
        }
        symbols[index(element.anchor)] = match (element.kind, element.big) {
            (ElementKind::Player, true) => Symbol::PlayerBig,
            (ElementKind::Player, false) => Symbol::PlayerSmall,
            (ElementKind::Box, true) => Symbol::BoxBig,
            (ElementKind::Box, false) => Symbol::BoxSmall,
        };
    }

    symbols
        .chunks(columns as usize)
        .map(|row| row.iter().map(|symbol| symbol.glyph()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scale_sokoban_core::{Command, LevelGrid, LevelMode};
    use scale_sokoban_world::{self as world, query, World};

    fn rendered(text: &str) -> String {
        let mut world = World::new();
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::LoadLevel {
                grid: LevelGrid::parse(text),
                mode: LevelMode::Interactive,
            },
            &mut events,
        );
        render_board(query::level(&world), &query::element_view(&world))
    }

    #[test]
    fn rendering_reproduces_simple_level() {
        let text = ".....\n.pbt*\n.+-T.";
        assert_eq!(rendered(text), text);
    }

    #[test]
    fn big_wall_renders_as_single_cells() {
        assert_eq!(rendered("#...\n....\n...."), "**..\n**..\n....");
    }
}
