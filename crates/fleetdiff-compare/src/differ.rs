//! Line-level unified diff used to explain canonical-form divergence.

/// One edit in the line-level diff of two texts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit<'a> {
    /// Line present in both texts.
    Equal(&'a str),
    /// Line only in the left (`want`) text.
    Remove(&'a str),
    /// Line only in the right (`got`) text.
    Add(&'a str),
}

/// Renders a unified diff of two texts with `want`/`got` file labels and
/// the given number of context lines around each change. Returns an empty
/// string when the texts are line-identical.
pub fn unified_diff(want: &str, got: &str, context: usize) -> String {
    let a: Vec<&str> = want.lines().collect();
    let b: Vec<&str> = got.lines().collect();
    let edits = edit_script(&a, &b);

    let changed: Vec<usize> = edits
        .iter()
        .enumerate()
        .filter(|(_, edit)| !matches!(edit, Edit::Equal(_)))
        .map(|(index, _)| index)
        .collect();
    if changed.is_empty() {
        return String::new();
    }

    // Line numbers on each side before every edit position.
    let mut want_line = Vec::with_capacity(edits.len() + 1);
    let mut got_line = Vec::with_capacity(edits.len() + 1);
    let (mut wl, mut gl) = (0usize, 0usize);
    for edit in &edits {
        want_line.push(wl);
        got_line.push(gl);
        match edit {
            Edit::Equal(_) => {
                wl += 1;
                gl += 1;
            }
            Edit::Remove(_) => wl += 1,
            Edit::Add(_) => gl += 1,
        }
    }
    want_line.push(wl);
    got_line.push(gl);

    // Cluster changes whose context windows touch into hunks.
    let mut hunks: Vec<(usize, usize)> = Vec::new();
    let mut start = changed[0].saturating_sub(context);
    let mut end = (changed[0] + 1 + context).min(edits.len());
    for &index in &changed[1..] {
        if index.saturating_sub(context) <= end {
            end = (index + 1 + context).min(edits.len());
        } else {
            hunks.push((start, end));
            start = index.saturating_sub(context);
            end = (index + 1 + context).min(edits.len());
        }
    }
    hunks.push((start, end));

    let mut out = String::new();
    out.push_str("--- want\n+++ got\n");
    for (start, end) in hunks {
        out.push_str(&format!(
            "@@ -{} +{} @@\n",
            format_range(want_line[start], want_line[end] - want_line[start]),
            format_range(got_line[start], got_line[end] - got_line[start]),
        ));
        for edit in &edits[start..end] {
            let (prefix, line) = match edit {
                Edit::Equal(line) => (' ', line),
                Edit::Remove(line) => ('-', line),
                Edit::Add(line) => ('+', line),
            };
            out.push(prefix);
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

/// Formats one side of a hunk header. `start` is the 0-based line number
/// of the first line in the hunk; empty ranges point at the line before
/// the insertion point, per the unified format.
fn format_range(start: usize, len: usize) -> String {
    match len {
        0 => format!("{},0", start),
        1 => format!("{}", start + 1),
        _ => format!("{},{}", start + 1, len),
    }
}

/// Longest-common-subsequence edit script between two line slices, with
/// removals ordered before additions within each change run.
fn edit_script<'a>(a: &[&'a str], b: &[&'a str]) -> Vec<Edit<'a>> {
    let (n, m) = (a.len(), b.len());
    let mut lcs = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if a[i] == b[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut edits = Vec::with_capacity(n.max(m));
    let mut removes = Vec::new();
    let mut adds = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if a[i] == b[j] {
            edits.append(&mut removes);
            edits.append(&mut adds);
            edits.push(Edit::Equal(a[i]));
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            removes.push(Edit::Remove(a[i]));
            i += 1;
        } else {
            adds.push(Edit::Add(b[j]));
            j += 1;
        }
    }
    removes.extend(a[i..].iter().copied().map(Edit::Remove));
    adds.extend(b[j..].iter().copied().map(Edit::Add));
    edits.append(&mut removes);
    edits.append(&mut adds);
    edits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_texts_produce_an_empty_diff() {
        assert_eq!(unified_diff("a\nb\n", "a\nb\n", 1), "");
    }

    #[test]
    fn a_single_changed_line_gets_one_line_of_context() {
        let diff = unified_diff("one\ntwo\nthree\nfour\n", "one\n2\nthree\nfour\n", 1);
        assert_eq!(
            diff,
            "--- want\n+++ got\n@@ -1,3 +1,3 @@\n one\n-two\n+2\n three\n"
        );
    }

    #[test]
    fn distant_changes_become_separate_hunks() {
        let want = "a\nb\nc\nd\ne\nf\ng\nh\n";
        let got = "A\nb\nc\nd\ne\nf\ng\nH\n";
        let diff = unified_diff(want, got, 1);
        assert_eq!(diff.matches("@@").count(), 4);
        assert!(diff.contains("-a\n+A\n b\n"));
        assert!(diff.contains(" g\n-h\n+H\n"));
    }

    #[test]
    fn pure_insertions_are_reported() {
        let diff = unified_diff("a\nc\n", "a\nb\nc\n", 1);
        assert!(diff.contains("+b\n"));
        assert!(!diff.contains("\n-"), "no removals expected: {diff}");
    }

    #[test]
    fn removals_print_before_additions_in_a_change_run() {
        let diff = unified_diff("x\ny\n", "p\nq\n", 1);
        assert_eq!(
            diff,
            "--- want\n+++ got\n@@ -1,2 +1,2 @@\n-x\n-y\n+p\n+q\n"
        );
    }
}
