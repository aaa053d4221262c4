use crate::grid::Node;

/// Twice the signed area of the triangle (p, q, r).
/// Positive for a counter-clockwise turn, negative for clockwise, zero when collinear.
fn orientation(p: Node, q: Node, r: Node) -> i64 {
    let (px, py) = (p.x as i64, p.y as i64);
    let (qx, qy) = (q.x as i64, q.y as i64);
    let (rx, ry) = (r.x as i64, r.y as i64);
    (qx - px) * (ry - py) - (qy - py) * (rx - px)
}

/// Whether `p` lies within the bounding box of segment (a, b).
/// Only meaningful once `p` is known to be collinear with the segment.
fn within_box(p: Node, a: Node, b: Node) -> bool {
    a.x.min(b.x) <= p.x && p.x <= a.x.max(b.x) && a.y.min(b.y) <= p.y && p.y <= a.y.max(b.y)
}

/// Returns true if segment (a1, a2) intersects segment (b1, b2).
///
/// Touching counts: a shared endpoint, an endpoint resting on the other
/// segment, and collinear overlap all intersect. Arithmetic is exact on
/// integer coordinates, so zero-length segments resolve deterministically
/// (a point intersects a segment iff it lies on it).
pub fn segments_intersect(a1: Node, a2: Node, b1: Node, b2: Node) -> bool {
    let d1 = orientation(b1, b2, a1);
    let d2 = orientation(b1, b2, a2);
    let d3 = orientation(a1, a2, b1);
    let d4 = orientation(a1, a2, b2);

    // Proper crossing: each segment straddles the other's supporting line
    if d1.signum() * d2.signum() < 0 && d3.signum() * d4.signum() < 0 {
        return true;
    }

    (d1 == 0 && within_box(a1, b1, b2))
        || (d2 == 0 && within_box(a2, b1, b2))
        || (d3 == 0 && within_box(b1, a1, a2))
        || (d4 == 0 && within_box(b2, a1, a2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(x: i32, y: i32) -> Node {
        Node::new(x, y)
    }

    #[test]
    fn test_proper_crossing() {
        assert!(segments_intersect(n(0, 0), n(2, 2), n(0, 2), n(2, 0)));
    }

    #[test]
    fn test_disjoint_segments() {
        assert!(!segments_intersect(n(0, 0), n(1, 1), n(3, 0), n(3, 5)));
        assert!(!segments_intersect(n(0, 0), n(4, 0), n(0, 1), n(4, 1)));
    }

    #[test]
    fn test_shared_endpoint_counts() {
        assert!(segments_intersect(n(0, 0), n(1, 1), n(1, 1), n(5, 1)));
    }

    #[test]
    fn test_endpoint_resting_on_segment() {
        // Diagonal move that ends on a horizontal barrier
        assert!(segments_intersect(n(3, 9), n(4, 10), n(0, 10), n(25, 10)));
        // Same move one row lower stays clear
        assert!(!segments_intersect(n(3, 8), n(4, 9), n(0, 10), n(25, 10)));
    }

    #[test]
    fn test_collinear_overlap_and_gap() {
        assert!(segments_intersect(n(0, 0), n(3, 0), n(2, 0), n(6, 0)));
        assert!(!segments_intersect(n(0, 0), n(1, 0), n(2, 0), n(6, 0)));
        assert!(segments_intersect(n(5, 2), n(5, 8), n(5, 0), n(5, 3)));
    }

    #[test]
    fn test_zero_length_segments() {
        assert!(segments_intersect(n(2, 0), n(2, 0), n(0, 0), n(4, 0)));
        assert!(!segments_intersect(n(2, 1), n(2, 1), n(0, 0), n(4, 0)));
        assert!(segments_intersect(n(1, 1), n(1, 1), n(1, 1), n(1, 1)));
        assert!(!segments_intersect(n(1, 1), n(1, 1), n(1, 2), n(1, 2)));
    }

    #[test]
    fn test_symmetric() {
        let cases = [
            (n(0, 0), n(2, 2), n(0, 2), n(2, 0)),
            (n(0, 0), n(1, 1), n(3, 0), n(3, 5)),
            (n(3, 9), n(4, 10), n(0, 10), n(25, 10)),
        ];
        for (a1, a2, b1, b2) in cases {
            assert_eq!(
                segments_intersect(a1, a2, b1, b2),
                segments_intersect(b1, b2, a1, a2)
            );
        }
    }
}
