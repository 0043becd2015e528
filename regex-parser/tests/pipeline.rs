use indoc::indoc;
use regex_parser::gerber::{AutomatonError, Dfa, Nfa, StateSet};
use regex_parser::{Error, MAX_DEPTH, ParseErrorKind, Regex, parse, regex_to_dfa, regex_to_nfa};

/// Backtracking reference matcher: every position where a match of `regex` starting at
/// `start` can end.
fn ends(regex: &Regex, input: &[char], start: usize) -> Vec<usize> {
    match regex {
        Regex::Literal(c) => match input.get(start) {
            Some(x) if x == c => vec![start + 1],
            _ => vec![],
        },
        Regex::Concat(head, tail) => {
            let mut out = Vec::new();
            for mid in ends(head, input, start) {
                for end in ends(tail, input, mid) {
                    if !out.contains(&end) {
                        out.push(end);
                    }
                }
            }
            out
        }
        Regex::Alternation(left, right) => {
            let mut out = ends(left, input, start);
            for end in ends(right, input, start) {
                if !out.contains(&end) {
                    out.push(end);
                }
            }
            out
        }
        Regex::Closure(inner) => {
            let mut out = vec![start];
            let mut i = 0;
            while i < out.len() {
                for end in ends(inner, input, out[i]) {
                    if !out.contains(&end) {
                        out.push(end);
                    }
                }
                i += 1;
            }
            out
        }
    }
}

fn reference_match(regex: &Regex, input: &[char]) -> bool {
    ends(regex, input, 0).contains(&input.len())
}

/// Every string over `alphabet` up to `max_len` characters, shortest first.
fn strings(alphabet: &[char], max_len: usize) -> Vec<Vec<char>> {
    let mut all = vec![vec![]];
    let mut layer: Vec<Vec<char>> = vec![vec![]];
    for _ in 0..max_len {
        let mut next = Vec::new();
        for prefix in &layer {
            for &c in alphabet {
                let mut s = prefix.clone();
                s.push(c);
                next.push(s);
            }
        }
        all.extend(next.iter().cloned());
        layer = next;
    }
    all
}

const REGEXES: [&str; 12] = [
    "a",
    "111",
    "1|1",
    "1***",
    "(0|1)*0.10*",
    "(a|b)*abb",
    "a(b|c)*",
    "(ab|c)*d",
    "x|y*z",
    "(a*b*)*",
    "((a|b)(a|b))*",
    "a(b(c)*)*",
];

#[test]
fn test_nfa_and_dfa_agree_with_reference() {
    for source in REGEXES {
        let tree = parse(source).unwrap();
        let nfa = regex_to_nfa(source).unwrap();
        let dfa = Dfa::from_nfa(&nfa).unwrap();

        let mut alphabet = tree.symbols();
        alphabet.push('z');
        for input in strings(&alphabet, 5) {
            let expected = reference_match(&tree, &input);
            assert_eq!(nfa.simulate_slice(&input), expected, "nfa {source} {input:?}");
            assert_eq!(dfa.simulate_slice(&input), expected, "dfa {source} {input:?}");
        }
    }
}

#[test]
fn test_dfa_is_deterministic_and_reproducible() {
    for source in REGEXES {
        let first = regex_to_dfa(source).unwrap();
        let second = regex_to_dfa(source).unwrap();
        assert_eq!(first.to_string(), second.to_string(), "{source}");
        assert_eq!(first.start(), 0);

        let subsets: Vec<StateSet> = first
            .states()
            .iter()
            .map(|state| state.nfa_states().unwrap())
            .collect();
        for (i, a) in subsets.iter().enumerate() {
            assert!(!a.is_empty(), "{source}");
            assert!(!subsets[i + 1..].contains(a), "{source}: duplicate subset {a}");
        }

        for state in first.states() {
            let mut seen = Vec::new();
            for &(symbol, _) in state.transitions() {
                assert!(!seen.contains(&symbol), "{source}");
                seen.push(symbol);
            }
        }
    }
}

#[test]
fn test_descriptions_read_back() {
    for source in REGEXES {
        let nfa = regex_to_nfa(source).unwrap();
        let reread: Nfa = nfa.to_string().parse().unwrap();
        assert_eq!(reread, nfa, "{source}");

        let dfa = Dfa::from_nfa(&nfa).unwrap();
        let reread: Dfa = dfa.to_string().parse().unwrap();
        assert_eq!(reread.to_string(), dfa.to_string(), "{source}");
    }
}

#[test]
fn test_binary_digits_dfa() {
    let expected = indoc! {"
        start: 0
        end: 0,1,2
        count: 3
        0--0-->1
        0--1-->2
        1--0-->1
        1--1-->2
        2--0-->1
        2--1-->2
    "};
    assert_eq!(regex_to_dfa("(0|1)*").unwrap().to_string(), expected);
}

#[test]
fn test_closure_epsilon_steps() {
    let nfa = regex_to_nfa("(a|b)*abb").unwrap();
    let start = nfa.epsilon_closure(nfa.start()).unwrap();
    assert!(start.contains(nfa.start()));
    assert_eq!(nfa.epsilon_closure_of(&start).unwrap(), start);

    let after_a = nfa.epsilon_closure_of(&nfa.move_on(&start, 'a').unwrap()).unwrap();
    assert!(!after_a.is_empty());
    assert!(!after_a.contains(nfa.end()));
}

#[test]
fn test_failures() {
    for source in ["", "|", "a|", "(a", "a)", "()", "**", "a#b"] {
        assert!(matches!(regex_to_dfa(source), Err(Error::Parse(_))), "{source:?}");
    }
    assert!(matches!(
        regex_to_dfa(&"(a|b)".repeat(11)),
        Err(Error::Automaton(AutomatonError::CapacityExceeded { .. }))
    ));
}

#[test]
fn test_deep_nesting_is_an_error() {
    let nested = |depth: usize| format!("{}a{}", "(".repeat(depth), ")".repeat(depth));

    let dfa = regex_to_dfa(&nested(200)).unwrap();
    assert_eq!(dfa.len(), 2);
    assert!(dfa.simulate_iter("a".chars()));

    for depth in [MAX_DEPTH + 1, 2000, 10000, 30000] {
        assert!(matches!(
            regex_to_dfa(&nested(depth)),
            Err(Error::Parse(err)) if err.kind == ParseErrorKind::TooDeep
        ));
    }
}
