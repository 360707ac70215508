//! Myers O(ND) difference over slices, with middle-snake bisection.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Edit {
    Equal(usize),
    Delete(usize),
    Insert(usize),
}

fn push(edits: &mut Vec<Edit>, edit: Edit) {
    match (edits.last_mut(), edit) {
        (_, Edit::Equal(0) | Edit::Delete(0) | Edit::Insert(0)) => return,
        (Some(Edit::Equal(n)), Edit::Equal(m))
        | (Some(Edit::Delete(n)), Edit::Delete(m))
        | (Some(Edit::Insert(n)), Edit::Insert(m)) => {
            *n += m;
            return;
        }
        _ => {}
    }
    edits.push(edit);
}

fn extend(edits: &mut Vec<Edit>, more: Vec<Edit>) {
    for edit in more {
        push(edits, edit);
    }
}

/// Edit script turning `src` into `dst`. Within a changed region deletes
/// come before inserts.
pub(crate) fn diff<T, F>(src: &[T], dst: &[T], eq: &F) -> Vec<Edit>
where
    F: Fn(&T, &T) -> bool,
{
    let prefix = src
        .iter()
        .zip(dst)
        .take_while(|(a, b)| eq(a, b))
        .count();
    let src_rest = &src[prefix..];
    let dst_rest = &dst[prefix..];
    let suffix = src_rest
        .iter()
        .rev()
        .zip(dst_rest.iter().rev())
        .take_while(|(a, b)| eq(a, b))
        .count();
    let src_mid = &src_rest[..src_rest.len() - suffix];
    let dst_mid = &dst_rest[..dst_rest.len() - suffix];

    let mut edits = Vec::new();
    push(&mut edits, Edit::Equal(prefix));
    extend(&mut edits, diff_no_common_affix(src_mid, dst_mid, eq));
    push(&mut edits, Edit::Equal(suffix));
    edits
}

fn diff_no_common_affix<T, F>(src: &[T], dst: &[T], eq: &F) -> Vec<Edit>
where
    F: Fn(&T, &T) -> bool,
{
    if src.is_empty() {
        return vec![Edit::Insert(dst.len())];
    }
    if dst.is_empty() {
        return vec![Edit::Delete(src.len())];
    }

    let src_longer = src.len() > dst.len();
    let (long, short) = if src_longer { (src, dst) } else { (dst, src) };
    let found = long
        .windows(short.len())
        .position(|window| window.iter().zip(short).all(|(a, b)| eq(a, b)));
    if let Some(index) = found {
        let end = long.len() - index - short.len();
        return if src_longer {
            vec![Edit::Delete(index), Edit::Equal(short.len()), Edit::Delete(end)]
        } else {
            vec![Edit::Insert(index), Edit::Equal(short.len()), Edit::Insert(end)]
        };
    }
    if short.len() == 1 {
        return vec![Edit::Delete(src.len()), Edit::Insert(dst.len())];
    }

    bisect(src, dst, eq)
}

fn bisect_split<T, F>(src: &[T], dst: &[T], x: usize, y: usize, eq: &F) -> Vec<Edit>
where
    F: Fn(&T, &T) -> bool,
{
    let mut edits = diff(&src[..x], &dst[..y], eq);
    extend(&mut edits, diff(&src[x..], &dst[y..], eq));
    edits
}

fn bisect<T, F>(a: &[T], b: &[T], eq: &F) -> Vec<Edit>
where
    F: Fn(&T, &T) -> bool,
{
    let n = a.len() as isize;
    let m = b.len() as isize;
    let max_d = (n + m + 1) / 2;
    let v_offset = max_d;
    let v_length = (2 * max_d + 2) as usize;
    let mut v1 = vec![-1isize; v_length];
    let mut v2 = vec![-1isize; v_length];
    v1[(v_offset + 1) as usize] = 0;
    v2[(v_offset + 1) as usize] = 0;

    let delta = n - m;
    let front = delta % 2 != 0;
    let mut k1start = 0isize;
    let mut k1end = 0isize;
    let mut k2start = 0isize;
    let mut k2end = 0isize;

    for d in 0..max_d {
        let mut k1 = -d + k1start;
        while k1 <= d - k1end {
            let k1_offset = v_offset + k1;
            let mut x1 = if k1 == -d
                || (k1 != d && v1[(k1_offset - 1) as usize] < v1[(k1_offset + 1) as usize])
            {
                v1[(k1_offset + 1) as usize]
            } else {
                v1[(k1_offset - 1) as usize] + 1
            };
            let mut y1 = x1 - k1;
            while x1 < n && y1 < m && eq(&a[x1 as usize], &b[y1 as usize]) {
                x1 += 1;
                y1 += 1;
            }
            v1[k1_offset as usize] = x1;
            if x1 > n {
                k1end += 2;
            } else if y1 > m {
                k1start += 2;
            } else if front {
                let k2_offset = v_offset + delta - k1;
                if k2_offset >= 0 && k2_offset < v_length as isize {
                    let x2 = v2[k2_offset as usize];
                    if x2 != -1 && x1 >= n - x2 {
                        return bisect_split(a, b, x1 as usize, y1 as usize, eq);
                    }
                }
            }
            k1 += 2;
        }

        let mut k2 = -d + k2start;
        while k2 <= d - k2end {
            let k2_offset = v_offset + k2;
            let mut x2 = if k2 == -d
                || (k2 != d && v2[(k2_offset - 1) as usize] < v2[(k2_offset + 1) as usize])
            {
                v2[(k2_offset + 1) as usize]
            } else {
                v2[(k2_offset - 1) as usize] + 1
            };
            let mut y2 = x2 - k2;
            while x2 < n
                && y2 < m
                && eq(&a[(n - x2 - 1) as usize], &b[(m - y2 - 1) as usize])
            {
                x2 += 1;
                y2 += 1;
            }
            v2[k2_offset as usize] = x2;
            if x2 > n {
                k2end += 2;
            } else if y2 > m {
                k2start += 2;
            } else if !front {
                let k1_offset = v_offset + delta - k2;
                if k1_offset >= 0 && k1_offset < v_length as isize {
                    let x1 = v1[k1_offset as usize];
                    if x1 != -1 {
                        let y1 = v_offset + x1 - k1_offset;
                        if x1 >= n - x2 {
                            return bisect_split(a, b, x1 as usize, y1 as usize, eq);
                        }
                    }
                }
            }
            k2 += 2;
        }
    }

    vec![Edit::Delete(a.len()), Edit::Insert(b.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn run(src: &str, dst: &str) -> Vec<Edit> {
        diff(&chars(src), &chars(dst), &|a: &char, b: &char| a == b)
    }

    /// Replays the script and checks it produces `dst`.
    fn replay(src: &str, dst: &str) {
        let (s, d) = (chars(src), chars(dst));
        let mut out = Vec::new();
        let (mut i, mut j) = (0, 0);
        for edit in run(src, dst) {
            match edit {
                Edit::Equal(n) => {
                    assert_eq!(&s[i..i + n], &d[j..j + n]);
                    out.extend_from_slice(&s[i..i + n]);
                    i += n;
                    j += n;
                }
                Edit::Delete(n) => i += n,
                Edit::Insert(n) => {
                    out.extend_from_slice(&d[j..j + n]);
                    j += n;
                }
            }
        }
        assert_eq!(i, s.len());
        assert_eq!(out, d);
    }

    #[test]
    fn trims_affixes() {
        assert_eq!(run("hello world!", "hello world"), vec![Edit::Equal(11), Edit::Delete(1)]);
        assert_eq!(run("abc", "abc"), vec![Edit::Equal(3)]);
        assert_eq!(run("", "ab"), vec![Edit::Insert(2)]);
    }

    #[test]
    fn containment_shortcut() {
        assert_eq!(
            run("xabcx", "abc"),
            vec![Edit::Delete(1), Edit::Equal(3), Edit::Delete(1)]
        );
    }

    #[test]
    fn bisect_scripts_replay() {
        for (src, dst) in [
            ("kitten", "sitting"),
            ("abcdef", "azced"),
            ("the quick brown fox", "a quick brown dog jumps"),
            ("0123456789", "9876543210"),
            ("ab", "ba"),
        ] {
            replay(src, dst);
        }
    }
}
