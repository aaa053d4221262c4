//! Renderer boundary. Searches never call into this module; callers hand a
//! finished result to whichever renderer they attach.

use crate::error::Result;
use crate::grid::{Environment, Node};
use rustc_hash::FxHashSet;
use std::io::Write;

/// Everything a renderer may draw.
pub struct Scene<'a> {
    pub title: &'a str,
    pub start: Node,
    pub goal: Node,
    pub range_x: (i32, i32),
    pub range_y: (i32, i32),
    pub obstacles: &'a FxHashSet<Node>,
    pub visited: &'a [Node],
    pub path: &'a [Node],
}

impl<'a> Scene<'a> {
    pub fn new(
        title: &'a str,
        env: &'a Environment,
        start: Node,
        goal: Node,
        visited: &'a [Node],
        path: &'a [Node],
    ) -> Self {
        Scene {
            title,
            start,
            goal,
            range_x: env.range_x(),
            range_y: env.range_y(),
            obstacles: env.obstacles(),
            visited,
            path,
        }
    }
}

pub trait Renderer {
    fn render(&mut self, scene: &Scene<'_>) -> Result<()>;
}

/// Character-cell renderer. Rows are printed top-down with y increasing upwards.
pub struct AsciiRenderer<W: Write> {
    out: W,
}

impl<W: Write> AsciiRenderer<W> {
    pub fn new(out: W) -> Self {
        AsciiRenderer { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for AsciiRenderer<W> {
    fn render(&mut self, scene: &Scene<'_>) -> Result<()> {
        let path: FxHashSet<Node> = scene.path.iter().copied().collect();
        let visited: FxHashSet<Node> = scene.visited.iter().copied().collect();
        let (x_min, x_max) = scene.range_x;
        let (y_min, y_max) = scene.range_y;

        writeln!(self.out, "=== {} ===", scene.title)?;
        writeln!(
            self.out,
            "Legend: S=Start, G=Goal, #=Obstacle, *=Path, .=Visited"
        )?;

        for y in (y_min..=y_max).rev() {
            write!(self.out, "{:3} ", y)?;
            for x in x_min..=x_max {
                let node = Node::new(x, y);
                let ch = if node == scene.start {
                    'S'
                } else if node == scene.goal {
                    'G'
                } else if path.contains(&node) {
                    '*'
                } else if scene.obstacles.contains(&node) {
                    '#'
                } else if visited.contains(&node) {
                    '.'
                } else {
                    ' '
                };
                write!(self.out, "{}", ch)?;
            }
            writeln!(self.out)?;
        }

        write!(self.out, "    ")?;
        for x in x_min..=x_max {
            write!(self.out, "{}", x.rem_euclid(10))?;
        }
        writeln!(self.out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_render_marks_cells() {
        let env = Environment::new([0, 5], [0, 5], vec![], vec![]).unwrap();
        let start = Node::new(1, 1);
        let goal = Node::new(3, 2);
        let path = [start, Node::new(2, 2), goal];
        let visited = [start, Node::new(2, 1), Node::new(2, 2)];
        let scene = Scene::new("test", &env, start, goal, &visited, &path);

        let mut renderer = AsciiRenderer::new(Vec::new());
        renderer.render(&scene).unwrap();
        let text = String::from_utf8(renderer.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "=== test ===");
        // y = 4 down to y = 0, then the column ruler
        assert_eq!(lines[2], "  4 #####");
        assert_eq!(lines[4], "  2 # *G#");
        assert_eq!(lines[5], "  1 #S. #");
        assert_eq!(lines[7], "    01234");
    }
}
