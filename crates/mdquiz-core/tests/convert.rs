//! End-to-end markdown to Moodle XML tests.

use mdquiz_core::moodle::{XmlNode, serialize};
use mdquiz_core::{
    ConvertError, Numbering, QuestionKind, QuizConverter, QuizSettings, TagSettings,
};
use pretty_assertions::assert_eq;

const FIXTURE: &str = include_str!("fixtures/networking.md");

fn question_nodes(tree: &XmlNode) -> Vec<&XmlNode> {
    tree.find_all("question").collect()
}

fn tags_of(question: &XmlNode) -> Vec<&str> {
    question
        .find("tags")
        .map(|tags| {
            tags.find_all("tag")
                .filter_map(|tag| tag.text_at("text"))
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn test_single_choice_document_exact_xml() {
    let markdown = "# Group 1, easy\n\nWhat is the first answer?\n\n- [x] first\n- [ ] second\n";
    let xml = QuizConverter::new().convert(markdown).unwrap();
    assert_eq!(
        xml,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<quiz>
  <question type="multichoice">
    <name>
      <text>What is the first answer?</text>
    </name>
    <questiontext format="html">
      <text>&lt;p&gt;What is the first answer?&lt;/p&gt;</text>
    </questiontext>
    <defaultgrade>1.0000000</defaultgrade>
    <penalty>0.3333333</penalty>
    <hidden>0</hidden>
    <tags>
      <tag>
        <text>Group 1</text>
      </tag>
      <tag>
        <text>easy</text>
      </tag>
    </tags>
    <shuffleanswers>true</shuffleanswers>
    <single>true</single>
    <answernumbering>abc</answernumbering>
    <answer fraction="100" format="html">
      <text>first</text>
      <feedback format="html">
        <text/>
      </feedback>
    </answer>
    <answer fraction="0" format="html">
      <text>second</text>
      <feedback format="html">
        <text/>
      </feedback>
    </answer>
  </question>
</quiz>
"#
    );
}

#[test]
fn test_fixture_question_kinds_and_order() {
    let questions = QuizConverter::new().parse(FIXTURE).unwrap();
    let kinds: Vec<_> = questions.iter().map(|q| q.kind).collect();
    assert_eq!(
        kinds,
        vec![
            QuestionKind::SingleChoice,
            QuestionKind::MultipleChoice,
            QuestionKind::AssociativeMatching,
            QuestionKind::EnumeratedMatching,
            QuestionKind::Numerical,
            QuestionKind::ShortAnswer,
            QuestionKind::Numerical,
        ]
    );
    assert_eq!(questions[0].name, "Transport of HTTP");
    assert!(!questions[0].config.shuffle);
    assert!(questions[1].config.shuffle);
}

#[test]
fn test_fixture_skips_commented_questions() {
    let questions = QuizConverter::new().parse(FIXTURE).unwrap();
    assert!(
        questions
            .iter()
            .all(|q| !q.description.contains("not ready") && !q.tags.contains(&"Drafts".to_owned()))
    );
}

#[test]
fn test_fixture_tags_follow_headings() {
    let converter = QuizConverter::new();
    let tree = converter.render(&converter.parse(FIXTURE).unwrap());
    let questions = question_nodes(&tree);
    assert_eq!(tags_of(questions[0]), vec!["Networking", "basics"]);
    assert_eq!(tags_of(questions[2]), vec!["Networking", "basics"]);
    assert_eq!(tags_of(questions[3]), vec!["Networking", "ordering"]);
    assert_eq!(tags_of(questions[6]), vec!["Networking", "ordering"]);
}

#[test]
fn test_fixture_rendered_answers() {
    let converter = QuizConverter::new();
    let tree = converter.render(&converter.parse(FIXTURE).unwrap());
    let questions = question_nodes(&tree);

    let inline_comment = questions[0];
    assert_eq!(inline_comment.text_at("shuffleanswers"), Some("false"));
    assert_eq!(
        inline_comment.text_at("questiontext/text"),
        Some("<p>Which transport protocol does HTTP/1.1 use?</p>")
    );

    let multi = questions[1];
    assert_eq!(multi.text_at("single"), Some("false"));
    let fractions: Vec<_> = multi
        .find_all("answer")
        .filter_map(|a| a.attr("fraction"))
        .collect();
    assert_eq!(fractions, vec!["50", "50", "-100"]);

    let associative = questions[2];
    assert_eq!(associative.attr("type"), Some("matching"));
    let pairs: Vec<_> = associative
        .find_all("subquestion")
        .map(|s| (s.text_at("text"), s.text_at("answer/text")))
        .collect();
    assert_eq!(
        pairs,
        vec![(Some("HTTP"), Some("TCP")), (Some("CoAP"), Some("UDP"))]
    );

    let enumerated = questions[3];
    assert_eq!(enumerated.text_at("shuffleanswers"), Some("false"));
    let positions: Vec<_> = enumerated
        .find_all("subquestion")
        .filter_map(|s| s.text_at("text"))
        .collect();
    assert_eq!(positions, vec!["1.", "2.", "3.", "4.", "5.", "6.", "7."]);
    assert_eq!(
        enumerated.find_all("subquestion").last().and_then(|s| s.text_at("answer/text")),
        Some("Application")
    );

    let numerical = questions[4];
    assert_eq!(numerical.attr("type"), Some("numerical"));
    assert_eq!(numerical.text_at("answer/text"), Some("32"));
    assert_eq!(numerical.text_at("answer/tolerance"), Some("0"));

    let short = questions[5];
    assert_eq!(short.attr("type"), Some("shortanswer"));
    assert_eq!(short.text_at("answer/text"), Some("Milky*Way"));

    let tolerance = questions[6];
    assert_eq!(tolerance.text_at("answer/text"), Some("3.14"));
    assert_eq!(tolerance.text_at("answer/tolerance"), Some("0.01"));
}

#[test]
fn test_directives_stripped_from_output() {
    let markdown = "Sort these. @shuffle=false @numbering=123\n\n- [x] a\n- [ ] b\n";
    let converter = QuizConverter::new();
    let questions = converter.parse(markdown).unwrap();
    assert!(!questions[0].config.shuffle);
    assert_eq!(questions[0].config.numbering, Numbering::Decimal);

    let xml = converter.convert(markdown).unwrap();
    assert!(!xml.contains("@shuffle"));
    assert!(!xml.contains("@numbering"));
    assert!(xml.contains("<answernumbering>123</answernumbering>"));
    assert!(xml.contains("<shuffleanswers>false</shuffleanswers>"));
}

#[test]
fn test_associative_ignores_choice_directives() {
    let markdown = "Match capitals. @force_multi=true @numbering=123\n\n- France: Paris\n- Italy: Rome\n";
    let converter = QuizConverter::new();
    let questions = converter.parse(markdown).unwrap();
    assert_eq!(questions[0].kind, QuestionKind::AssociativeMatching);
    assert_eq!(questions[0].answers.len(), 2);
    assert_eq!(questions[0].description, "<p>Match capitals.</p>");

    let xml = converter.convert(markdown).unwrap();
    assert!(xml.contains(r#"<question type="matching">"#));
    assert!(xml.contains("<text>France</text>"));
    assert!(!xml.contains("<answernumbering>"));
    assert!(!xml.contains("<single>"));
    assert!(!xml.contains("@force_multi"));
}

#[test]
fn test_comment_markers_in_code_keep_questions() {
    let markdown = "\
Which token opens an HTML comment? `<!--`

- [x] that one
- [ ] another

Pick the tag.

- [x] p
- [ ] q

Which token closes it? `-->`

- [x] this
- [ ] that
";
    let questions = QuizConverter::new().parse(markdown).unwrap();
    assert_eq!(questions.len(), 3);
    assert!(questions[0].description.contains("<code>&lt;!--</code>"));
}

#[test]
fn test_enumerated_ignores_shuffle_directive() {
    let markdown = "Order them. @shuffle=true\n\n1. one\n2. two\n";
    let xml = QuizConverter::new().convert(markdown).unwrap();
    assert!(xml.contains("<shuffleanswers>false</shuffleanswers>"));
}

#[test]
fn test_configured_tags_and_grades() {
    let settings = QuizSettings {
        default_grade: 2.0,
        penalty: 0.1,
        tags: TagSettings {
            general: vec!["course".to_owned()],
            shortanswer: vec!["text".to_owned()],
            ..TagSettings::default()
        },
        ..QuizSettings::default()
    };
    let converter = QuizConverter::with_settings(settings);
    let tree = converter.render(&converter.parse("# week 1\n\nName it.\n\n- thing\n").unwrap());
    let question = tree.find("question").unwrap();
    assert_eq!(tags_of(question), vec!["week 1", "course", "text"]);
    assert_eq!(question.text_at("defaultgrade"), Some("2.0000000"));
    assert_eq!(question.text_at("penalty"), Some("0.1000000"));
}

#[test]
fn test_second_list_fails_whole_document() {
    let markdown = "Q1\n\n- [x] a\n- [ ] b\n\nQ2\n\n- [x] c\n- [ ] d\n\n1. extra\n";
    let err = QuizConverter::new().parse(markdown).unwrap_err();
    assert!(matches!(err, ConvertError::Structure { .. }), "{err}");
    assert_eq!(err.location().block, 5);
}

#[test]
fn test_no_checked_answer_fails() {
    let err = QuizConverter::new()
        .parse("Q\n\n- [ ] a\n- [ ] b\n")
        .unwrap_err();
    assert!(matches!(err, ConvertError::Classification { .. }), "{err}");
}

#[test]
fn test_html_in_answers_is_escaped_in_xml() {
    let markdown = "Which is **bold**?\n\n- [x] `a < b`\n- [ ] plain\n";
    let xml = QuizConverter::new().convert(markdown).unwrap();
    assert!(xml.contains("<text>&lt;p&gt;Which is &lt;strong&gt;bold&lt;/strong&gt;?&lt;/p&gt;</text>"));
    assert!(xml.contains("<text>&lt;code&gt;a &amp;lt; b&lt;/code&gt;</text>"));
}

#[test]
fn test_empty_document_renders_empty_quiz() {
    let xml = serialize(&QuizConverter::new().render(&[])).unwrap();
    assert_eq!(xml, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<quiz/>\n");
}
