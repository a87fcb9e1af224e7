//! Key-frame animation evaluator.
//!
//! Scalar attributes in the scene file are either plain numbers or
//! semicolon-separated key-frame lists such as `-1.0;1.0(i,0.5);2.0(o);3.0(0.9)`.
//! Each key-frame carries a target value, a target time on the normalized
//! scene timeline [0, 1] and the easing used into it. The easing is latched
//! from the most recent explicit tag and defaults to linear; the first
//! key-frame's time defaults to 0, all later ones to 1. Evaluation happens
//! at parse time: the scene is rebuilt for every (sub-)frame, so a scalar
//! only ever needs its value at one instant.

/// Easing applied over a key-frame segment's normalized time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Easing {
    Linear,
    CubicIn,
    CubicOut,
    CubicBoth,
}

impl Easing {
    fn from_tag(tag: char) -> Option<Self> {
        match tag {
            'l' => Some(Easing::Linear),
            'i' => Some(Easing::CubicIn),
            'o' => Some(Easing::CubicOut),
            'b' => Some(Easing::CubicBoth),
            _ => None,
        }
    }

    fn apply(self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::CubicIn => t.powi(3),
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
            Easing::CubicBoth => {
                if t < 0.5 {
                    (t * 2.0).powi(3) / 2.0
                } else {
                    1.0 - ((1.0 - t) * 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// One parsed key-frame: value, optional easing tag, optional target time.
struct KeyFrame {
    value: f32,
    easing: Option<Easing>,
    time: Option<f32>,
}

/// Evaluates an animated scalar attribute at scene time `scene_time`.
///
/// A plain number evaluates to itself at every time. Unparsable trailing
/// content ends the list without an error, matching the tolerant attribute
/// grammar of the scene format; an out-of-range or ill-ordered key-frame
/// time is an error.
pub fn evaluate(attr: &str, scene_time: f32) -> Result<f32, String> {
    let mut rest = attr;
    let mut start = true;
    let mut value = 0.0f32;
    let mut time = 0.0f32;
    let mut easing = Easing::Linear;

    loop {
        let Some((frame, tail)) = next_key_frame(rest, start)? else {
            break;
        };
        rest = tail;

        if let Some(tag) = frame.easing {
            easing = tag;
        }
        let target_time = frame.time.unwrap_or(if start { 0.0 } else { 1.0 });
        if !(0.0..=1.0).contains(&target_time) {
            return Err("invalid animation time".to_string());
        }

        if start || target_time < scene_time {
            // this key-frame is in the past; latch it and move on
            if time > target_time {
                return Err("animation time not in increasing order".to_string());
            }
            value = frame.value;
            time = target_time;
        } else if time > scene_time {
            // the first key-frame itself starts after the scene time
            return Ok(value);
        } else {
            // scene time falls into this segment
            let t = (scene_time - time) / (target_time - time);
            return Ok(easing.apply(t) * (frame.value - value) + value);
        }

        start = false;
    }

    // past the last key-frame
    Ok(value)
}

/// Parses the next key-frame off the front of `rest`. Returns `None` when
/// the list ends (including at unparsable trailing content).
fn next_key_frame(rest: &str, start: bool) -> Result<Option<(KeyFrame, &str)>, String> {
    let mut s = rest.trim_start();
    if !start {
        match s.strip_prefix(';') {
            Some(tail) => s = tail,
            None => return Ok(None),
        }
    }
    s = s.trim_start();

    let Some((number, tail)) = take_number(s) else {
        return Ok(None);
    };
    let value: f32 = number
        .parse()
        .map_err(|_| format!("invalid number \"{number}\" in animation"))?;
    s = tail.trim_start();

    let mut frame = KeyFrame {
        value,
        easing: None,
        time: None,
    };

    // optional `(easing[, time])` or `(time)` group; a malformed group ends
    // the list after this key-frame
    if let Some(group) = s.strip_prefix('(') {
        match parse_group(group, &mut frame) {
            Some(tail) => s = tail.trim_start(),
            None => return Ok(Some((frame, ""))),
        }
    }

    Ok(Some((frame, s)))
}

/// Parses the parenthesized part after a key-frame value, starting just
/// behind the opening parenthesis. Returns the remaining input, or `None`
/// if the group does not follow the grammar.
fn parse_group<'a>(group: &'a str, frame: &mut KeyFrame) -> Option<&'a str> {
    let mut s = group.trim_start();

    let first = s.chars().next()?;
    if let Some(easing) = Easing::from_tag(first) {
        // an easing tag must be followed by `,` or `)`
        let after = s[first.len_utf8()..].trim_start();
        if !after.starts_with(',') && !after.starts_with(')') {
            return None;
        }
        frame.easing = Some(easing);
        s = after;
        if let Some(tail) = s.strip_prefix(',') {
            s = tail.trim_start();
            let (number, tail) = take_number(s)?;
            frame.time = Some(number.parse().ok()?);
            s = tail.trim_start();
        }
        return s.strip_prefix(')');
    }

    if let Some((number, tail)) = take_number(s) {
        frame.time = Some(number.parse().ok()?);
        s = tail.trim_start();
    }
    s.strip_prefix(')')
}

/// Scans the longest float literal prefix: optional sign, digits with an
/// optional fraction, optional exponent.
fn take_number(s: &str) -> Option<(&str, &str)> {
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }
    let digits_start = i;
    while matches!(bytes.get(i), Some(b'0'..=b'9')) {
        i += 1;
    }
    if matches!(bytes.get(i), Some(b'.')) {
        i += 1;
        while matches!(bytes.get(i), Some(b'0'..=b'9')) {
            i += 1;
        }
    }
    if i == digits_start {
        return None;
    }
    if matches!(bytes.get(i), Some(b'e') | Some(b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+') | Some(b'-')) {
            j += 1;
        }
        let exp_start = j;
        while matches!(bytes.get(j), Some(b'0'..=b'9')) {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    Some((&s[..i], &s[i..]))
}

#[test]
fn plain_number_is_constant() {
    for t in [0.0, 0.25, 1.0] {
        assert_eq!(evaluate("1.0", t).unwrap(), 1.0);
        assert_eq!(evaluate("-2.5e1", t).unwrap(), -25.0);
    }
}

#[test]
fn key_frames_reproduce_their_own_values() {
    let attr = "0.0; 4.0(l,0.5); 2.0";
    assert_eq!(evaluate(attr, 0.0).unwrap(), 0.0);
    assert_eq!(evaluate(attr, 0.5).unwrap(), 4.0);
    assert_eq!(evaluate(attr, 1.0).unwrap(), 2.0);
}

#[test]
fn linear_triangle_profile() {
    let attr = "0.0; 1.0(l,0.5); 0.0";
    let expected = [(0.0, 0.0), (0.25, 0.5), (0.5, 1.0), (0.75, 0.5), (1.0, 0.0)];
    for (t, want) in expected {
        assert!((evaluate(attr, t).unwrap() - want).abs() < 1e-6);
    }
}

#[test]
fn later_key_frames_default_to_time_one() {
    let attr = "0.0; 1.0(l)";
    assert!((evaluate(attr, 0.5).unwrap() - 0.5).abs() < 1e-6);
    assert!((evaluate(attr, 1.0).unwrap() - 1.0).abs() < 1e-6);
}

#[test]
fn before_first_key_frame_returns_its_value() {
    let attr = "5.0(l,0.5); 9.0";
    assert_eq!(evaluate(attr, 0.2).unwrap(), 5.0);
}

#[test]
fn easing_is_latched_until_overridden() {
    // cubic-in carries over into the second segment
    let attr = "0.0; 1.0(i,0.5); 2.0";
    let at = |t: f32| evaluate(attr, t).unwrap();
    assert!((at(0.25) - 0.125).abs() < 1e-6);
    assert!((at(0.75) - 1.125).abs() < 1e-6);
}

#[test]
fn cubic_out_and_both() {
    let out = "0.0; 1.0(o)";
    assert!((evaluate(out, 0.5).unwrap() - 0.875).abs() < 1e-6);
    let both = "0.0; 1.0(b)";
    assert!((evaluate(both, 0.25).unwrap() - 0.0625).abs() < 1e-6);
    assert!((evaluate(both, 0.75).unwrap() - 0.9375).abs() < 1e-6);
    assert!((evaluate(both, 0.5).unwrap() - 0.5).abs() < 1e-6);
}

#[test]
fn monotonic_time_increase_within_segment() {
    let attr = "0.0; 1.0(b,0.5); 0.5";
    let mut previous = evaluate(attr, 0.0).unwrap();
    for i in 1..=10 {
        let next = evaluate(attr, i as f32 * 0.05).unwrap();
        assert!(next >= previous);
        previous = next;
    }
}

#[test]
fn out_of_range_time_is_an_error() {
    assert!(evaluate("1.0(1.5)", 0.0).is_err());
    assert!(evaluate("1.0(-0.5)", 0.0).is_err());
}

#[test]
fn decreasing_times_are_an_error() {
    assert!(evaluate("1.0(0.8); 2.0(0.5)", 0.9).is_err());
}

#[test]
fn empty_parens_default_the_time() {
    assert!((evaluate("0.0; 1.0()", 0.5).unwrap() - 0.5).abs() < 1e-6);
}
