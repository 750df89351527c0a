//! Built-in sample catalog
//!
//! The 30-template clinical starter set used to seed an empty store on
//! first run. Kept verbatim so the catalog is usable out of the box.

use chrono::{Duration, Utc};
use kardex_types::{Section, TagId, Template, TemplateId};

fn template(
    id: &str,
    title: &str,
    disease: &str,
    template_type: &str,
    tags: &[&str],
    days_ago: i64,
    favorite: bool,
    sections: &[(&str, &str)],
) -> Template {
    let stamp = Utc::now() - Duration::days(days_ago);
    Template {
        id: TemplateId::new(id),
        title: title.to_string(),
        sections: sections
            .iter()
            .map(|(title, content)| Section::new(*title, *content))
            .collect(),
        disease: disease.to_string(),
        template_type: template_type.to_string(),
        tags: tags.iter().map(|tag| TagId::new(*tag)).collect(),
        created_at: stamp,
        updated_at: stamp,
        is_favorite: favorite,
    }
}

/// The full sample catalog, ids "1" through "30"
pub fn sample_templates() -> Vec<Template> {
    vec![
        template(
            "1",
            "高血压病历模板",
            "心血管疾病",
            "门诊病历",
            &["常见病", "慢性病"],
            1,
            true,
            &[
                ("主诉", "头痛、头晕3天"),
                ("现病史", "患者3天前无明显诱因出现头痛、头晕，伴恶心，无呕吐，无胸闷气短。"),
                ("既往史", "高血压病史5年，平时服用降压药物控制。"),
                ("体格检查", "血压：160/95mmHg，心率：78次/分，律齐。"),
                ("诊断", "高血压病2级（极高危）"),
            ],
        ),
        template(
            "2",
            "糖尿病病历模板",
            "内分泌疾病",
            "门诊病历",
            &["常见病", "慢性病"],
            2,
            false,
            &[
                ("主诉", "多饮、多尿、多食、消瘦2月"),
                ("现病史", "患者2月前开始出现多饮、多尿、多食，体重下降5kg。"),
                ("既往史", "否认糖尿病家族史。"),
                ("体格检查", "体重：65kg，身高：170cm，BMI：22.5"),
                ("辅助检查", "空腹血糖：12.5mmol/L，糖化血红蛋白：9.2%"),
                ("诊断", "2型糖尿病"),
            ],
        ),
        template(
            "3",
            "急性心肌梗死病历模板",
            "心血管疾病",
            "急诊病历",
            &["急危重症", "心血管"],
            3,
            true,
            &[
                ("主诉", "胸痛3小时"),
                ("现病史", "患者3小时前突发胸骨后压榨性疼痛，向左肩背部放射，伴大汗、恶心。"),
                ("既往史", "高血压病史10年，吸烟史20年。"),
                ("体格检查", "血压：90/60mmHg，心率：110次/分，心律不齐。"),
                ("辅助检查", "心电图：V1-V6导联ST段抬高，肌钙蛋白I：15.2ng/ml"),
                ("诊断", "急性ST段抬高型心肌梗死"),
            ],
        ),
        template(
            "4",
            "肺炎病历模板",
            "呼吸系统疾病",
            "住院病历",
            &["感染性疾病", "呼吸系统"],
            4,
            false,
            &[
                ("主诉", "发热、咳嗽、咳痰5天"),
                ("现病史", "患者5天前受凉后出现发热，最高体温39.2℃，伴咳嗽、咳黄痰。"),
                ("既往史", "平素体健，否认慢性病史。"),
                ("体格检查", "体温：38.5℃，右下肺可闻及湿性啰音。"),
                ("辅助检查", "胸片：右下肺片状阴影，WBC：12.5×10^9/L"),
                ("诊断", "社区获得性肺炎"),
            ],
        ),
        template(
            "5",
            "急性胃炎病历模板",
            "消化系统疾病",
            "门诊病历",
            &["急性疾病", "消化系统"],
            5,
            false,
            &[
                ("主诉", "上腹痛、恶心、呕吐1天"),
                ("现病史", "患者1天前进食不洁食物后出现上腹痛，伴恶心、呕吐。"),
                ("既往史", "否认胃病史。"),
                ("体格检查", "上腹部压痛，无反跳痛，肠鸣音活跃。"),
                ("诊断", "急性胃炎"),
            ],
        ),
        template(
            "6",
            "骨折手术记录模板",
            "骨科疾病",
            "手术记录",
            &["外科手术", "骨科"],
            6,
            true,
            &[
                ("术前诊断", "右股骨颈骨折"),
                ("术后诊断", "右股骨颈骨折术后"),
                ("手术名称", "右股骨颈骨折切开复位内固定术"),
                ("手术经过", "患者仰卧位，腰硬联合麻醉，常规消毒铺巾..."),
                ("术后处理", "术后抗感染治疗，功能锻炼指导。"),
            ],
        ),
        template(
            "7",
            "抑郁症病历模板",
            "精神疾病",
            "门诊病历",
            &["精神疾病", "心理健康"],
            7,
            false,
            &[
                ("主诉", "情绪低落、兴趣减退3月"),
                ("现病史", "患者3月前无明显诱因出现情绪低落，兴趣减退，睡眠障碍。"),
                ("既往史", "否认精神病史。"),
                ("精神检查", "意识清楚，情绪低落，思维迟缓，注意力不集中。"),
                ("诊断", "抑郁症（中度）"),
            ],
        ),
        template(
            "8",
            "小儿发热病历模板",
            "儿科疾病",
            "门诊病历",
            &["儿科", "感染性疾病"],
            8,
            false,
            &[
                ("主诉", "发热2天"),
                ("现病史", "患儿2天前无明显诱因出现发热，最高体温39.5℃。"),
                ("既往史", "足月顺产，生长发育正常。"),
                ("体格检查", "体温：38.8℃，咽部充血，扁桃体I度肿大。"),
                ("诊断", "上呼吸道感染"),
            ],
        ),
        template(
            "9",
            "白内障手术记录模板",
            "眼科疾病",
            "手术记录",
            &["外科手术", "眼科"],
            9,
            true,
            &[
                ("术前诊断", "双眼老年性白内障"),
                ("术后诊断", "右眼老年性白内障术后"),
                ("手术名称", "右眼白内障超声乳化摘除+人工晶体植入术"),
                ("手术经过", "患者仰卧位，表面麻醉，常规消毒铺巾..."),
                ("术后处理", "术后抗炎治疗，定期复查。"),
            ],
        ),
        template(
            "10",
            "皮肤过敏病历模板",
            "皮肤科疾病",
            "门诊病历",
            &["过敏性疾病", "皮肤科"],
            10,
            false,
            &[
                ("主诉", "全身皮疹、瘙痒3天"),
                ("现病史", "患者3天前接触某种化妆品后出现全身皮疹，伴瘙痒。"),
                ("既往史", "有过敏性体质。"),
                ("体格检查", "全身散在红色丘疹，部分融合成片。"),
                ("诊断", "接触性皮炎"),
            ],
        ),
        template(
            "11",
            "妊娠检查记录模板",
            "妇产科疾病",
            "门诊病历",
            &["妇产科", "产前检查"],
            11,
            false,
            &[
                ("主诉", "停经8周，要求产前检查"),
                ("现病史", "患者末次月经8周前，停经后无阴道流血。"),
                ("既往史", "月经规律，否认不良孕产史。"),
                ("体格检查", "子宫增大如孕8周大小，质软。"),
                ("辅助检查", "HCG：15000mIU/ml，B超：宫内早孕"),
                ("诊断", "早期妊娠"),
            ],
        ),
        template(
            "12",
            "急性阑尾炎病历模板",
            "外科疾病",
            "急诊病历",
            &["急性疾病", "外科"],
            12,
            true,
            &[
                ("主诉", "右下腹痛12小时"),
                ("现病史", "患者12小时前进食后出现上腹痛，后转移至右下腹。"),
                ("既往史", "平素体健。"),
                ("体格检查", "右下腹压痛、反跳痛，McBurney点压痛明显。"),
                ("辅助检查", "WBC：15.2×10^9/L，中性粒细胞比例：85%"),
                ("诊断", "急性阑尾炎"),
            ],
        ),
        template(
            "13",
            "慢性肾炎病历模板",
            "泌尿系统疾病",
            "门诊病历",
            &["慢性病", "泌尿系统"],
            13,
            false,
            &[
                ("主诉", "蛋白尿、血尿6月"),
                ("现病史", "患者6月前体检发现尿蛋白阳性，伴镜下血尿。"),
                ("既往史", "否认肾病家族史。"),
                ("体格检查", "血压：140/90mmHg，双下肢轻度水肿。"),
                ("辅助检查", "尿蛋白：++，尿红细胞：10-15/HP"),
                ("诊断", "慢性肾小球肾炎"),
            ],
        ),
        template(
            "14",
            "甲状腺功能亢进病历模板",
            "内分泌疾病",
            "门诊病历",
            &["内分泌", "甲状腺疾病"],
            14,
            false,
            &[
                ("主诉", "心悸、多汗、消瘦3月"),
                ("现病史", "患者3月前出现心悸、多汗、怕热，体重下降8kg。"),
                ("既往史", "否认甲状腺疾病史。"),
                ("体格检查", "甲状腺弥漫性肿大，可闻及血管杂音。"),
                ("辅助检查", "TSH：<0.01mIU/L，FT3：15.2pmol/L，FT4：45.6pmol/L"),
                ("诊断", "Graves病"),
            ],
        ),
        template(
            "15",
            "脑梗死病历模板",
            "神经系统疾病",
            "急诊病历",
            &["急危重症", "神经系统"],
            15,
            true,
            &[
                ("主诉", "左侧肢体无力2小时"),
                ("现病史", "患者2小时前突发左侧肢体无力，伴言语不清。"),
                ("既往史", "高血压病史15年，房颤病史5年。"),
                ("体格检查", "左侧肢体肌力3级，病理征阳性。"),
                ("辅助检查", "头颅CT：右侧基底节区低密度影"),
                ("诊断", "急性脑梗死"),
            ],
        ),
        template(
            "16",
            "哮喘病历模板",
            "呼吸系统疾病",
            "门诊病历",
            &["慢性病", "过敏性疾病"],
            16,
            false,
            &[
                ("主诉", "反复咳嗽、喘息5年，加重3天"),
                ("现病史", "患者5年来反复出现咳嗽、喘息，近3天症状加重。"),
                ("既往史", "有过敏性鼻炎病史。"),
                ("体格检查", "双肺可闻及广泛哮鸣音。"),
                ("辅助检查", "肺功能：FEV1/FVC：65%，支气管舒张试验阳性"),
                ("诊断", "支气管哮喘急性发作期"),
            ],
        ),
        template(
            "17",
            "胆囊炎病历模板",
            "消化系统疾病",
            "急诊病历",
            &["急性疾病", "消化系统"],
            17,
            false,
            &[
                ("主诉", "右上腹痛6小时"),
                ("现病史", "患者6小时前进食油腻食物后出现右上腹痛。"),
                ("既往史", "有胆囊结石病史。"),
                ("体格检查", "右上腹压痛，Murphy征阳性。"),
                ("辅助检查", "B超：胆囊壁增厚，胆囊内多发结石"),
                ("诊断", "急性胆囊炎"),
            ],
        ),
        template(
            "18",
            "类风湿关节炎病历模板",
            "风湿免疫疾病",
            "门诊病历",
            &["慢性病", "风湿免疫"],
            18,
            false,
            &[
                ("主诉", "双手关节疼痛、晨僵1年"),
                ("现病史", "患者1年来双手关节疼痛，晨僵持续1小时以上。"),
                ("既往史", "否认关节炎家族史。"),
                ("体格检查", "双手近端指间关节肿胀、压痛。"),
                ("辅助检查", "RF：120IU/ml，抗CCP抗体阳性"),
                ("诊断", "类风湿关节炎"),
            ],
        ),
        template(
            "19",
            "痔疮病历模板",
            "外科疾病",
            "门诊病历",
            &["常见病", "外科"],
            19,
            false,
            &[
                ("主诉", "便血、肛门疼痛1月"),
                ("现病史", "患者1月来排便时出血，伴肛门疼痛。"),
                ("既往史", "有便秘史。"),
                ("体格检查", "肛门3、7、11点见内痔，质软。"),
                ("诊断", "内痔（II期）"),
            ],
        ),
        template(
            "20",
            "癫痫病历模板",
            "神经系统疾病",
            "门诊病历",
            &["慢性病", "神经系统"],
            20,
            false,
            &[
                ("主诉", "反复抽搐发作2年"),
                ("现病史", "患者2年来反复出现全身强直阵挛性发作。"),
                ("既往史", "有头外伤史。"),
                ("体格检查", "神经系统检查无明显异常。"),
                ("辅助检查", "脑电图：双侧额颞区尖波、棘波"),
                ("诊断", "癫痫（全面性强直阵挛发作）"),
            ],
        ),
        template(
            "21",
            "乳腺癌病历模板",
            "肿瘤疾病",
            "住院病历",
            &["肿瘤", "外科"],
            21,
            true,
            &[
                ("主诉", "发现左乳肿块2月"),
                ("现病史", "患者2月前自摸发现左乳外上象限肿块。"),
                ("既往史", "否认乳腺疾病史。"),
                ("体格检查", "左乳外上象限可触及2×2cm肿块，质硬。"),
                ("辅助检查", "乳腺钼靶：左乳BI-RADS 5类，病理：浸润性导管癌"),
                ("诊断", "左乳浸润性导管癌"),
            ],
        ),
        template(
            "22",
            "前列腺增生病历模板",
            "泌尿系统疾病",
            "门诊病历",
            &["老年病", "泌尿系统"],
            22,
            false,
            &[
                ("主诉", "排尿困难、夜尿增多1年"),
                ("现病史", "患者1年来排尿困难，尿线细，夜尿4-5次。"),
                ("既往史", "否认泌尿系统疾病史。"),
                ("体格检查", "前列腺增大，质韧，表面光滑。"),
                ("辅助检查", "PSA：3.2ng/ml，B超：前列腺体积60ml"),
                ("诊断", "良性前列腺增生"),
            ],
        ),
        template(
            "23",
            "青光眼病历模板",
            "眼科疾病",
            "门诊病历",
            &["慢性病", "眼科"],
            23,
            false,
            &[
                ("主诉", "视力下降、眼胀痛3月"),
                ("现病史", "患者3月来视力逐渐下降，伴眼胀痛。"),
                ("既往史", "有高度近视史。"),
                ("体格检查", "眼压：右眼35mmHg，左眼32mmHg"),
                ("辅助检查", "视野检查：双眼视野缺损，OCT：视神经纤维层变薄"),
                ("诊断", "原发性开角型青光眼"),
            ],
        ),
        template(
            "24",
            "耳鸣病历模板",
            "耳鼻喉疾病",
            "门诊病历",
            &["耳鼻喉", "神经性疾病"],
            24,
            false,
            &[
                ("主诉", "双耳鸣响2周"),
                ("现病史", "患者2周前无明显诱因出现双耳鸣响。"),
                ("既往史", "否认耳部疾病史。"),
                ("体格检查", "双侧鼓膜完整，听力粗测正常。"),
                ("辅助检查", "纯音测听：双耳高频听力下降"),
                ("诊断", "神经性耳鸣"),
            ],
        ),
        template(
            "25",
            "牙周炎病历模板",
            "口腔疾病",
            "门诊病历",
            &["口腔科", "慢性病"],
            25,
            false,
            &[
                ("主诉", "牙龈出血、口臭6月"),
                ("现病史", "患者6月来刷牙时牙龈出血，伴口臭。"),
                ("既往史", "口腔卫生习惯不良。"),
                ("体格检查", "牙龈红肿，探诊出血，牙周袋深度4-6mm。"),
                ("辅助检查", "X线片：牙槽骨吸收"),
                ("诊断", "慢性牙周炎"),
            ],
        ),
        template(
            "26",
            "腰椎间盘突出病历模板",
            "骨科疾病",
            "门诊病历",
            &["骨科", "慢性病"],
            26,
            true,
            &[
                ("主诉", "腰痛伴左下肢放射痛3月"),
                ("现病史", "患者3月前搬重物后出现腰痛，伴左下肢放射痛。"),
                ("既往史", "有腰部外伤史。"),
                ("体格检查", "腰4-5棘突间压痛，直腿抬高试验阳性。"),
                ("辅助检查", "腰椎MRI：L4-5椎间盘突出"),
                ("诊断", "腰4-5椎间盘突出症"),
            ],
        ),
        template(
            "27",
            "荨麻疹病历模板",
            "皮肤科疾病",
            "门诊病历",
            &["过敏性疾病", "皮肤科"],
            27,
            false,
            &[
                ("主诉", "全身风团、瘙痒1周"),
                ("现病史", "患者1周前进食海鲜后出现全身风团，伴瘙痒。"),
                ("既往史", "有食物过敏史。"),
                ("体格检查", "全身散在大小不等风团，部分融合。"),
                ("诊断", "急性荨麻疹"),
            ],
        ),
        template(
            "28",
            "子宫肌瘤病历模板",
            "妇产科疾病",
            "门诊病历",
            &["妇产科", "良性肿瘤"],
            28,
            false,
            &[
                ("主诉", "月经量增多、经期延长1年"),
                ("现病史", "患者1年来月经量明显增多，经期延长至10天。"),
                ("既往史", "月经规律，无不良孕产史。"),
                ("体格检查", "子宫增大如孕12周大小，质硬。"),
                ("辅助检查", "B超：子宫多发肌瘤，最大约5×4cm"),
                ("诊断", "子宫多发性肌瘤"),
            ],
        ),
        template(
            "29",
            "痛风病历模板",
            "风湿免疫疾病",
            "急诊病历",
            &["急性疾病", "风湿免疫"],
            29,
            false,
            &[
                ("主诉", "右足第一跖趾关节疼痛2天"),
                ("现病史", "患者2天前饮酒后出现右足第一跖趾关节剧烈疼痛。"),
                ("既往史", "有高尿酸血症病史。"),
                ("体格检查", "右足第一跖趾关节红肿、压痛明显。"),
                ("辅助检查", "血尿酸：580μmol/L"),
                ("诊断", "痛风性关节炎急性发作"),
            ],
        ),
        template(
            "30",
            "慢性阻塞性肺疾病病历模板",
            "呼吸系统疾病",
            "住院病历",
            &["慢性病", "呼吸系统"],
            30,
            true,
            &[
                ("主诉", "慢性咳嗽、咳痰、气短10年，加重1周"),
                ("现病史", "患者10年来慢性咳嗽、咳痰，活动后气短，近1周症状加重。"),
                ("既往史", "吸烟史30年，每日1包。"),
                ("体格检查", "桶状胸，双肺呼吸音减弱，可闻及干啰音。"),
                ("辅助检查", "肺功能：FEV1/FVC：55%，胸片：双肺纹理增粗"),
                ("诊断", "慢性阻塞性肺疾病急性加重期"),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_shape() {
        let templates = sample_templates();
        assert_eq!(templates.len(), 30);
        assert_eq!(templates[0].id, TemplateId::new("1"));
        assert_eq!(templates[29].id, TemplateId::new("30"));
    }

    #[test]
    fn test_ids_unique() {
        let templates = sample_templates();
        let mut ids: Vec<&str> = templates.iter().map(|t| t.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 30);
    }

    #[test]
    fn test_favorites() {
        let templates = sample_templates();
        let favorites: Vec<&str> = templates
            .iter()
            .filter(|t| t.is_favorite)
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(favorites, vec!["1", "3", "6", "9", "12", "15", "21", "26", "30"]);
    }

    #[test]
    fn test_timestamps_hold_invariant() {
        assert!(sample_templates()
            .iter()
            .all(|t| t.updated_at >= t.created_at));
    }
}
