use crate::types::Group;

const MAX_WIDTH: f64 = 80.0;

/// Draws one stock piece as a three-line bar: each cut is a labelled cell,
/// any offcut is a dotted cell at the end.
pub fn render_group(group: &Group) -> String {
    let total = group.stock_length.max(group.used);
    if total == 0 {
        return String::new();
    }
    let scale = MAX_WIDTH / total as f64;

    // Cell boundaries on the grid, one past each cut; cells are at least one
    // column wide so short cuts stay visible.
    let mut bounds = vec![0usize];
    let mut acc = 0u32;
    for &len in &group.items {
        acc += len;
        let x = (acc as f64 * scale).round() as usize;
        let prev = bounds[bounds.len() - 1];
        bounds.push(x.max(prev + 2));
    }
    let cut_end = bounds[bounds.len() - 1];
    let end = if group.remainder() > 0 {
        let x = (total as f64 * scale).round() as usize;
        x.max(cut_end + 2)
    } else {
        cut_end
    };
    if end == 0 {
        return String::new();
    }

    let mut grid = vec![vec![' '; end + 1]; 3];
    for x in 0..=end {
        grid[0][x] = '-';
        grid[2][x] = '-';
    }
    for x in cut_end + 1..end {
        grid[1][x] = '.';
    }
    for &x in bounds.iter().chain(std::iter::once(&end)) {
        grid[0][x] = '+';
        grid[1][x] = '|';
        grid[2][x] = '+';
    }

    for (i, &len) in group.items.iter().enumerate() {
        let (sx, ex) = (bounds[i], bounds[i + 1]);
        let label: Vec<char> = len.to_string().chars().collect();
        let inner = ex - sx - 1;
        if label.len() <= inner {
            let start = sx + 1 + (inner - label.len()) / 2;
            for (j, &ch) in label.iter().enumerate() {
                grid[1][start + j] = ch;
            }
        }
    }

    let mut result = String::new();
    for row in &grid {
        let line: String = row.iter().collect();
        result.push_str(line.trim_end());
        result.push('\n');
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(items: &[u32], stock_length: u32) -> Group {
        let mut g = Group::new(stock_length);
        for &len in items {
            g.push(len);
        }
        g
    }

    #[test]
    fn test_render_cuts_and_offcut() {
        let output = render_group(&group(&[1000, 1000], 2500));
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with('+'));
        assert_eq!(lines[1].matches("1000").count(), 2);
        assert!(lines[1].contains('.'));
        assert!(lines[1].ends_with('|'));
    }

    #[test]
    fn test_render_exact_fit_has_no_offcut() {
        let output = render_group(&group(&[2000, 500], 2500));
        assert!(!output.contains('.'));
        assert!(output.contains("2000"));
    }

    #[test]
    fn test_render_tiny_cut_still_gets_a_cell() {
        let output = render_group(&group(&[5800, 10], 5850));
        let middle = output.lines().nth(1).unwrap();
        assert!(middle.matches('|').count() >= 3);
    }

    #[test]
    fn test_render_over_capacity() {
        let output = render_group(&group(&[9000], 5850));
        assert!(output.contains("9000"));
        assert!(!output.contains('.'));
    }

    #[test]
    fn test_render_empty_group() {
        assert_eq!(render_group(&Group::new(0)), "");
    }
}
